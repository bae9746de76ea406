use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
}

/// A status message for the user that is not observation data.
#[derive(Debug, Serialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info<S: Into<String>>(message: S) -> Notice {
        Notice {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn warning<S: Into<String>>(message: S) -> Notice {
        Notice {
            level: Level::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => write!(f, "{}", self.message),
            Level::Warning => write!(f, "WARNING: {}", self.message),
        }
    }
}
