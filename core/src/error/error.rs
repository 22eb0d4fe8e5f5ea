use thiserror::Error;

use super::fault::FatalFault;
use super::log::LogError;

pub const EXIT_USAGE: i32 = 64;
pub const EXIT_VALIDATION: i32 = 65;
pub const EXIT_FATAL: i32 = 70;
pub const EXIT_IO: i32 = 74;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Help text the operator asked for. Still a failure outcome.
    #[error("{0}")]
    Help(String),
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Fatal(#[from] FatalFault),
    #[error("logging failed: {0}")]
    Log(#[from] LogError),
    #[error("dump failed: {0:#}")]
    Dump(#[from] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn exit_code(&self) -> i32 {
        // 0: success
        // 64: usage error or help
        // 65: validation error
        // 70: internal fault or trapped crash
        // 74: io / logging / extraction failure
        match self {
            Self::Help(_) | Self::Usage(_) => EXIT_USAGE,
            Self::Validation(_) => EXIT_VALIDATION,
            Self::Fatal(_) => EXIT_FATAL,
            Self::Log(_) | Self::Dump(_) | Self::Io(_) => EXIT_IO,
        }
    }

    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help(_))
    }
}
