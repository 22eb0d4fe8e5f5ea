mod load;
mod types;
mod validate;

pub use types::{
    ExtractConfig, LoggingConfig, Overrides, DEFAULT_BLOCK_SIZE, DEFAULT_EXTENT_SIZE,
    DEFAULT_LOG_FILTER, DEFAULT_MOD_COUNT, DEFAULT_OUTPUT_FILE,
};
pub use validate::parse_positive;
