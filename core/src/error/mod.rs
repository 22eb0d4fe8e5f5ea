#[allow(clippy::module_inception)]
pub mod error;
pub mod fault;
pub mod log;

pub use error::{ExtractError, EXIT_FATAL, EXIT_IO, EXIT_USAGE, EXIT_VALIDATION};
pub use fault::FatalFault;
pub use log::LogError;
