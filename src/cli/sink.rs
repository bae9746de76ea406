use crate::cli::opts::Format;
use crate::data::notice::Notice;
use serde::Serialize;
use snafu::Snafu;
use std::fmt::Display;
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Error creating json: {}", source))]
    Json { source: serde_json::Error },

    #[snafu(display("Error writing output: {}", source))]
    Io { source: std::io::Error },
}

/// Values that can be presented to the user in every output format.
/// Json values are written as one object per line.
pub trait Sink
where
    Self: Serialize + Display,
{
    fn write(format: &Format, value: &Self) -> Result<(), Error> {
        match format {
            Format::Json => json_line(std::io::stdout().lock(), value),
            Format::Default => {
                println!("{}", value);
                Ok(())
            }
        }
    }
    fn write_err(format: &Format, value: &Self) -> Result<(), Error> {
        match format {
            Format::Json => json_line(std::io::stderr().lock(), value),
            Format::Default => {
                eprintln!("{}", value);
                Ok(())
            }
        }
    }
}

fn json_line<W: Write, A: Serialize + ?Sized>(mut out: W, value: &A) -> Result<(), Error> {
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json { source: e }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io { source: e }
    }
}

impl Sink for Notice {}

#[test]
fn json_is_one_line() {
    let mut buf = Vec::new();
    json_line(&mut buf, &Notice::warning("many\nobservations")).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "{\"level\":\"warning\",\"message\":\"many\\nobservations\"}\n"
    );
}

#[test]
fn json_of_unsized_value() {
    let mut buf = Vec::new();
    json_line(&mut buf, "plain text").unwrap();
    json_line(&mut buf, &[1, 2][..]).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "\"plain text\"\n[1,2]\n");
}
