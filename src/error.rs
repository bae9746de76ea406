//! Global error types

use crate::cli::cmd;
use snafu::Snafu;

/// Exit code for invalid input and for error replies of the API.
pub const EXIT_QUERY_ERROR: i32 = 255;

/// Exit code for everything else that goes wrong (network, files, …).
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{}", source))]
    Cmd { source: cmd::CmdError },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Cmd { source } => source.exit_code(),
        }
    }
}

pub type Result<A> = std::result::Result<A, Error>;

impl From<cmd::CmdError> for Error {
    fn from(e: cmd::CmdError) -> Error {
        Error::Cmd { source: e }
    }
}
