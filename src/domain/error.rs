//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pairtrader.
#[derive(Debug, thiserror::Error)]
pub enum PairtraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient history ending {date}: have {have} bars, need {need}")]
    InsufficientHistory {
        date: NaiveDate,
        have: usize,
        need: usize,
    },

    #[error("no bar after {date}")]
    OutOfRange { date: NaiveDate },

    #[error("no bar on {date}")]
    UnknownDate { date: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PairtraderError> for std::process::ExitCode {
    fn from(err: &PairtraderError) -> Self {
        let code: u8 = match err {
            PairtraderError::Io(_) => 1,
            PairtraderError::ConfigParse { .. }
            | PairtraderError::ConfigMissing { .. }
            | PairtraderError::ConfigInvalid { .. } => 2,
            PairtraderError::Data { .. } => 3,
            PairtraderError::InsufficientHistory { .. }
            | PairtraderError::OutOfRange { .. }
            | PairtraderError::UnknownDate { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
