pub mod observation;
pub mod range;
pub mod single;

use super::opts::{Format, LimitChoice, MainOpts};
use super::sink::{Error as SinkError, Sink};
use crate::config::{ConfigError, FetchConfig};
use crate::data::notice::Notice;
use crate::error::{EXIT_FAILURE, EXIT_QUERY_ERROR};
use crate::httpclient::{self, Client};
use crate::util::file;
use snafu::{ResultExt, Snafu};
use std::fmt;
use std::path::PathBuf;

/// Everything the query modes need: the resolved settings and the
/// http client.
pub struct Context {
    pub format: Format,
    pub quiet: bool,
    pub no_download: bool,
    pub limit: Option<LimitChoice>,
    pub debug: bool,
    pub client: Client,
    pub output_dir: PathBuf,
}

impl Context {
    pub fn new(opts: &MainOpts) -> Result<Context, CmdError> {
        let config = FetchConfig::load(opts.common_opts.config.as_deref()).context(ConfigSnafu)?;
        Context::create(opts, &config)
    }

    pub fn create(opts: &MainOpts, config: &FetchConfig) -> Result<Context, CmdError> {
        let common = &opts.common_opts;
        let api_url = config.api_url(common.api_url.as_ref().map(|u| u.as_str()));
        let client = Client::new(api_url).context(ContextCreateSnafu)?;
        let output_dir = config.output_dir(common.output_dir.as_deref());
        log::debug!("Saving files below {}", output_dir.display());
        Ok(Context {
            format: common.format,
            quiet: opts.quiet,
            no_download: opts.no_download,
            limit: opts.preset_limit(),
            debug: common.verbose > 1,
            client,
            output_dir,
        })
    }

    /// A short hand for `Sink::write(self.format(), value)`
    fn write_result<A: Sink>(&self, value: &A) -> Result<(), SinkError> {
        Sink::write(&self.format, value)
    }

    /// Shows a status message. Json output keeps stdout for data, so
    /// messages go to stderr there.
    fn notify(&self, notice: Notice) -> Result<(), SinkError> {
        match self.format {
            Format::Json => Sink::write_err(&self.format, &notice),
            Format::Default => Sink::write(&self.format, &notice),
        }
    }

    pub fn observation_dir(&self, observation_id: u64) -> PathBuf {
        file::observation_dir(&self.output_dir, observation_id)
    }
}

/// How a run ended, when it ended without an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// A single observation was processed.
    Single { files: usize },
    /// All pages of a date range were processed.
    Finished { observations: usize, pages: u32 },
    /// Processing stopped after the requested number of observations.
    LimitReached { observations: usize },
    /// The user chose not to process the observations.
    Declined,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Single { files } => write!(f, "1 observation, {} file(s)", files),
            Outcome::Finished {
                observations,
                pages,
            } => write!(f, "{} observation(s) on {} page(s)", observations, pages),
            Outcome::LimitReached { observations } => {
                write!(f, "stopped at the limit of {} observation(s)", observations)
            }
            Outcome::Declined => write!(f, "nothing processed"),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum CmdError {
    #[snafu(display("ContextCreate - {}", source))]
    ContextCreate { source: httpclient::Error },

    #[snafu(display("Config - {}", source))]
    Config { source: ConfigError },

    #[snafu(display(
        "Catch all case. If you see this, something weird happened.\n\
         Check that all required parameters are correct and try again."
    ))]
    MissingSelector,

    #[snafu(display("{}", source))]
    Single { source: single::Error },

    #[snafu(display("{}", source))]
    Range { source: range::Error },
}

impl CmdError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CmdError::ContextCreate { .. } | CmdError::Config { .. } => EXIT_FAILURE,
            CmdError::MissingSelector => EXIT_QUERY_ERROR,
            CmdError::Single { source } => source.exit_code(),
            CmdError::Range { source } => source.exit_code(),
        }
    }
}

impl From<single::Error> for CmdError {
    fn from(source: single::Error) -> Self {
        CmdError::Single { source }
    }
}

impl From<range::Error> for CmdError {
    fn from(source: range::Error) -> Self {
        CmdError::Range { source }
    }
}

#[cfg(test)]
pub(crate) fn test_context(api_url: &str, output_dir: &std::path::Path, flags: &[&str]) -> Context {
    use clap::Parser;

    let mut args = vec![
        "satnogs-fetch".to_string(),
        "--api-url".to_string(),
        api_url.to_string(),
        "--output-dir".to_string(),
        output_dir.display().to_string(),
    ];
    args.extend(flags.iter().map(|s| s.to_string()));
    let opts = MainOpts::try_parse_from(args).unwrap();
    Context::create(&opts, &FetchConfig::default()).unwrap()
}

#[test]
fn context_from_args() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = test_context(
        "http://localhost:1234",
        tmp.path(),
        &["13", "-d", "2018-08-01/2018-08-02", "-l", "3", "-vv"],
    );
    assert_eq!(ctx.client.base_url(), "http://localhost:1234");
    assert_eq!(
        ctx.limit,
        Some(LimitChoice::Limit(std::num::NonZeroUsize::new(3).unwrap()))
    );
    assert!(ctx.debug);
    assert_eq!(ctx.observation_dir(42), tmp.path().join("42"));
}
