//! Asks the user how many observations to process when a date range
//! yields a lot of them.

use super::opts::LimitChoice;
use snafu::Snafu;
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;

const QUESTION: &str =
    "Input y to proceed, n to quit, or give an integer to limit observations to that number.";

#[derive(Debug, PartialEq, Snafu)]
pub enum ChoiceError {
    #[snafu(display(">>> Please enter a positive integer."))]
    NotPositive,

    #[snafu(display(">>> INVALID OPTION"))]
    Invalid,
}

/// Reads an answer to the limit question.
pub fn parse_choice(input: &str) -> Result<LimitChoice, ChoiceError> {
    match input.trim() {
        "y" => Ok(LimitChoice::Unlimited),
        "n" => Ok(LimitChoice::Abort),
        other => match other.parse::<i64>() {
            Ok(n) if n > 0 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(LimitChoice::Limit)
                .ok_or(ChoiceError::Invalid),
            Ok(_) => Err(ChoiceError::NotPositive),
            Err(_) => Err(ChoiceError::Invalid),
        },
    }
}

/// Asks until a valid answer is given. Running out of input is an
/// error.
pub fn ask_limit<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<LimitChoice> {
    loop {
        writeln!(out, "{}", QUESTION)?;
        write!(out, "Select an option: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer given to the limit question",
            ));
        }
        match parse_choice(&line) {
            Ok(choice) => return Ok(choice),
            Err(e) => writeln!(out, "{}", e)?,
        }
    }
}

#[test]
fn parse_accepted_answers() {
    assert_eq!(parse_choice("y"), Ok(LimitChoice::Unlimited));
    assert_eq!(parse_choice("n\n"), Ok(LimitChoice::Abort));
    assert_eq!(
        parse_choice(" 25 \n"),
        Ok(LimitChoice::Limit(NonZeroUsize::new(25).unwrap()))
    );
}

#[test]
fn parse_rejected_answers() {
    assert_eq!(parse_choice("0"), Err(ChoiceError::NotPositive));
    assert_eq!(parse_choice("-3"), Err(ChoiceError::NotPositive));
    assert_eq!(parse_choice("Y"), Err(ChoiceError::Invalid));
    assert_eq!(parse_choice("yes"), Err(ChoiceError::Invalid));
    assert_eq!(parse_choice("2.5"), Err(ChoiceError::Invalid));
    assert_eq!(parse_choice(""), Err(ChoiceError::Invalid));
}

#[test]
fn ask_repeats_until_valid() {
    let mut input = io::Cursor::new("maybe\n0\n4\n");
    let mut out = Vec::new();
    let choice = ask_limit(&mut input, &mut out).unwrap();
    assert_eq!(choice, LimitChoice::Limit(NonZeroUsize::new(4).unwrap()));

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Select an option: ").count(), 3);
    assert!(text.contains(">>> INVALID OPTION"));
    assert!(text.contains(">>> Please enter a positive integer."));
}

#[test]
fn ask_fails_on_end_of_input() {
    let mut input = io::Cursor::new("x\n");
    let mut out = Vec::new();
    let err = ask_limit(&mut input, &mut out).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
