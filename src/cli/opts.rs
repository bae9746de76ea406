use clap::{ArgAction, ArgGroup, Parser, ValueEnum, ValueHint};
use reqwest::Url;
use std::num::NonZeroUsize;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n  Sha: ",
    env!("VERGEN_GIT_SHA"),
    "\n  Built at: ",
    env!("VERGEN_BUILD_TIMESTAMP")
);

/// Options that are not about which observations to fetch, but how
/// the program talks to the network and presents its results.
#[derive(Parser, Debug, Clone)]
#[command()]
pub struct CommonOpts {
    /// Be more verbose when logging. Verbosity increases with each
    /// occurence of that option.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// How to format the output. The default is human readable and
    /// prints a block of fields per observation. The json output
    /// format prints one JSON object per observation and line.
    #[arg(short, long, value_enum, default_value_t = Format::Default)]
    pub format: Format,

    /// The (base) URL to the SatNOGS Network. It can be given as
    /// environment variable SATNOGS_FETCH_API_URL or in the config
    /// file.
    #[arg(long, value_hint = ValueHint::Url)]
    pub api_url: Option<Url>,

    /// The directory where the per-observation folders are created.
    /// Defaults to the current directory.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// A config file to read instead of the default one.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

/// A script to get observation data from the SatNOGS Network.
///
/// Prints information about the observations of a ground station and
/// downloads their data files (audio, waterfall and demodulated data)
/// into a folder per observation id. Either a single observation or
/// all observations within a date range are fetched.
#[derive(Parser, Debug)]
#[command(name = "satnogs-fetch", version, long_version = LONG_VERSION)]
#[command(group(
    ArgGroup::new("selector")
        .required(true)
        .args(["observation_id", "date_range"])
))]
pub struct MainOpts {
    #[clap(flatten)]
    pub common_opts: CommonOpts,

    /// ID of ground station to gather observation data from.
    pub station_id: u32,

    /// Observation ID for a specific observation.
    #[arg(short, long)]
    pub observation_id: Option<u64>,

    /// Date range for a set of observations.
    /// Format (start/end): yyyy-mm-dd/yyyy-mm-dd
    #[arg(short, long)]
    pub date_range: Option<String>,

    /// Suppress printing of observation info (files will still be
    /// saved).
    #[arg(short, long, conflicts_with = "no_download")]
    pub quiet: bool,

    /// Do not download data files for the observations.
    #[arg(short, long)]
    pub no_download: bool,

    /// Process at most this many observations of a date range,
    /// without asking.
    #[arg(short, long, conflicts_with = "yes")]
    pub limit: Option<NonZeroUsize>,

    /// Process all observations of a date range without asking, even
    /// if there are many.
    #[arg(short, long)]
    pub yes: bool,
}

impl MainOpts {
    /// Returns which observations to fetch. Clap guarantees that
    /// exactly one of the two options is present.
    pub fn selector(&self) -> Option<Selector> {
        match (self.observation_id, &self.date_range) {
            (Some(id), None) => Some(Selector::ById(id)),
            (None, Some(range)) => Some(Selector::ByDateRange(range.clone())),
            _ => None,
        }
    }

    /// The limit given on the command line, if any, so the interactive
    /// question can be skipped.
    pub fn preset_limit(&self) -> Option<LimitChoice> {
        match (self.limit, self.yes) {
            (Some(n), _) => Some(LimitChoice::Limit(n)),
            (None, true) => Some(LimitChoice::Unlimited),
            (None, false) => None,
        }
    }
}

/// Selects the observations to work on.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    ById(u64),
    /// The unchecked date range argument.
    ByDateRange(String),
}

/// How many observations of a date range are processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitChoice {
    Unlimited,
    Abort,
    Limit(NonZeroUsize),
}

/// The format for presenting the results.
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq)]
pub enum Format {
    Json,
    Default,
}

#[test]
fn selector_from_args() {
    let opts = MainOpts::try_parse_from(["satnogs-fetch", "13", "-o", "12345"]).unwrap();
    assert_eq!(opts.selector(), Some(Selector::ById(12345)));

    let opts =
        MainOpts::try_parse_from(["satnogs-fetch", "13", "-d", "2018-08-01/2018-08-02"]).unwrap();
    assert_eq!(
        opts.selector(),
        Some(Selector::ByDateRange("2018-08-01/2018-08-02".into()))
    );
}

#[test]
fn selector_is_required_and_exclusive() {
    assert!(MainOpts::try_parse_from(["satnogs-fetch", "13"]).is_err());
    assert!(MainOpts::try_parse_from([
        "satnogs-fetch",
        "13",
        "-o",
        "1",
        "-d",
        "2018-08-01/2018-08-02"
    ])
    .is_err());
}

#[test]
fn quiet_and_no_download_conflict() {
    assert!(MainOpts::try_parse_from(["satnogs-fetch", "13", "-o", "1", "-q", "-n"]).is_err());
    let opts = MainOpts::try_parse_from(["satnogs-fetch", "13", "-o", "1", "-n"]).unwrap();
    assert!(opts.no_download);
    assert!(!opts.quiet);
}

#[test]
fn preset_limit_from_flags() {
    let opts =
        MainOpts::try_parse_from(["satnogs-fetch", "7", "-d", "2020-01-01/2020-01-02", "-l", "3"])
            .unwrap();
    assert_eq!(
        opts.preset_limit(),
        Some(LimitChoice::Limit(NonZeroUsize::new(3).unwrap()))
    );

    let opts = MainOpts::try_parse_from(["satnogs-fetch", "7", "-d", "2020-01-01/2020-01-02", "-y"])
        .unwrap();
    assert_eq!(opts.preset_limit(), Some(LimitChoice::Unlimited));

    assert!(MainOpts::try_parse_from(["satnogs-fetch", "7", "-o", "1", "-l", "0"]).is_err());
    assert!(MainOpts::try_parse_from(["satnogs-fetch", "7", "-o", "1", "-l", "2", "-y"]).is_err());
}

#[test]
fn format_from_args() {
    let opts = MainOpts::try_parse_from(["satnogs-fetch", "13", "-o", "1"]).unwrap();
    assert_eq!(opts.common_opts.format, Format::Default);
    let opts = MainOpts::try_parse_from(["satnogs-fetch", "-f", "json", "13", "-o", "1"]).unwrap();
    assert_eq!(opts.common_opts.format, Format::Json);
    assert!(MainOpts::try_parse_from(["satnogs-fetch", "-f", "yaml", "13", "-o", "1"]).is_err());
}
