//! dbextract core: configuration model, execution context, log subsystem and
//! the bootstrap coordinator that runs one extraction between logging start
//! and logging shutdown.

pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod fault;
pub mod logging;
pub mod runner;

pub use config::{ExtractConfig, LoggingConfig, Overrides};
pub use context::{ContextHandle, ExecutionContext, Terminate};
pub use coordinator::{Coordinator, Phase};
pub use error::{ExtractError, FatalFault, LogError};
pub use logging::{LogSubsystem, TracingLog};
pub use runner::{DumpRunner, Runner};
