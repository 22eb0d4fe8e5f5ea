use thiserror::Error;

use crate::coordinator::Phase;
use crate::logging::CallbackRole;

/// Catastrophic or internal-consistency failures. Never recovered.
#[derive(Error, Debug)]
pub enum FatalFault {
    #[error("Internal crash detected.")]
    Crash,
    #[error("{0} callback invoked more than once")]
    RepeatedCallback(CallbackRole),
    #[error("{0} callback invoked after the operation completed inline")]
    UnexpectedCallback(CallbackRole),
    #[error("{0} callback fired and operation also reported inline completion")]
    DoubleCompletion(CallbackRole),
    #[error("{0} callback dropped without firing")]
    CallbackDropped(CallbackRole),
    #[error("invalid coordinator transition from {from:?} to {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
    #[error("runner already consumed")]
    RunnerConsumed,
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("execution context needs at least one worker")]
    NoWorkers,
    #[error("worker {0} is not accepting work")]
    WorkerClosed(usize),
    #[error("could not install handler for signal {signal}: {source}")]
    TrapInstall {
        signal: i32,
        source: std::io::Error,
    },
}
