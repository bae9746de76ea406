use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use snafu::Snafu;

/// Suffix turning a calendar date into the UTC midnight timestamp the
/// API expects.
const MIDNIGHT_UTC: &str = "T00:00:00Z";

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})/(\d{4}-\d{2}-\d{2})$").expect("valid date range pattern")
});

/// A range of calendar dates given as `yyyy-mm-dd/yyyy-mm-dd`.
///
/// Only the shape is checked, the dates are passed to the API
/// verbatim. That start is before end is not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(display("Invalid format for date range '{}'. Use [-h] for help.", input))]
pub struct DateRangeParseError {
    input: String,
}

impl DateRange {
    pub fn parse(s: &str) -> Result<DateRange, DateRangeParseError> {
        s.parse::<DateRange>()
    }

    pub fn start_timestamp(&self) -> String {
        format!("{}{}", self.start, MIDNIGHT_UTC)
    }

    pub fn end_timestamp(&self) -> String {
        format!("{}{}", self.end, MIDNIGHT_UTC)
    }
}

impl FromStr for DateRange {
    type Err = DateRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DATE_RANGE.captures(s) {
            Some(caps) => Ok(DateRange {
                start: caps[1].to_string(),
                end: caps[2].to_string(),
            }),
            None => Err(DateRangeParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

#[test]
fn parse_valid_range() {
    for input in ["2018-08-01/2018-08-31", "2020-12-31/2019-01-01", "0000-00-00/9999-99-99"] {
        let range = DateRange::parse(input).unwrap();
        let (start, end) = input.split_once('/').unwrap();
        assert_eq!(range.start, start);
        assert_eq!(range.end, end);
        assert_eq!(range.to_string(), input);
    }
}

#[test]
fn parse_invalid_range() {
    for input in [
        "",
        "2018-08-01",
        "2018-08-01-2018-08-31",
        "2018-08-01 2018-08-31",
        "2018-8-01/2018-08-31",
        "2018-08-01/2018-08-1",
        "18-08-01/2018-08-31",
        "x2018-08-01/2018-08-31",
        "2018-08-01/2018-08-31x",
        "2018-08-01/2018-08-31/",
        "2018/08/01-2018/08/31",
    ] {
        assert!(DateRange::parse(input).is_err(), "accepted: {}", input);
    }
}

#[test]
fn timestamps_are_midnight_utc() {
    let range = DateRange::parse("2018-08-01/2018-08-02").unwrap();
    assert_eq!(range.start_timestamp(), "2018-08-01T00:00:00Z");
    assert_eq!(range.end_timestamp(), "2018-08-02T00:00:00Z");
}
