use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExtractError;

use super::validate;

pub const DEFAULT_OUTPUT_FILE: &str = "memcached_dump.out";
pub const DEFAULT_BLOCK_SIZE: u32 = 4 * 1024;
pub const DEFAULT_EXTENT_SIZE: u32 = 8 * 1024 * 1024;
pub const DEFAULT_MOD_COUNT: u32 = 1;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Structural parameters forced by the operator instead of read from file headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    pub block_size: Option<NonZeroU32>,
    pub extent_size: Option<NonZeroU32>,
    pub mod_count: Option<NonZeroU32>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.block_size.is_none() && self.extent_size.is_none() && self.mod_count.is_none()
    }
}

/// A validated extraction request. Only constructible through [`ExtractConfig::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractConfig {
    input_path: PathBuf,
    log_path: Option<PathBuf>,
    output_path: PathBuf,
    overrides: Overrides,
}

impl ExtractConfig {
    pub fn try_new(
        input_path: PathBuf,
        log_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        overrides: Overrides,
    ) -> Result<Self, ExtractError> {
        let config = Self {
            input_path,
            log_path,
            output_path: output_path.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            overrides,
        };
        validate::validate(&config)?;
        Ok(config)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// `None` means log to stderr.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,

    /// EnvFilter string, e.g. "info" or "dbextract_core=debug".
    pub filter: String,

    /// Colourise output. Only ever set for a terminal stderr.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: DEFAULT_LOG_FILTER.to_string(),
            ansi: false,
        }
    }
}
