//! Log subsystem seam.
//!
//! `start` and `shutdown` either finish before returning (`Ok(true)`, the
//! callback is never fired) or finish later (`Ok(false)`), in which case the
//! callback fires exactly once from the worker's run-queue.

mod completion;
mod tracing_log;

use std::cell::Cell;
use std::fmt;

use crate::error::LogError;

pub use completion::{pair, Callback, Completion};
pub use tracing_log::TracingLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackRole {
    Ready,
    ShutdownComplete,
}

impl fmt::Display for CallbackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::ShutdownComplete => f.write_str("shutdown-complete"),
        }
    }
}

thread_local! {
    static STDERR_SINK: Cell<bool> = const { Cell::new(false) };
}

/// Whether this thread's log output currently lands on stderr.
pub fn writes_to_stderr() -> bool {
    STDERR_SINK.with(Cell::get)
}

pub(crate) fn mark_stderr(on: bool) {
    STDERR_SINK.with(|sink| sink.set(on));
}

pub trait LogSubsystem {
    fn start(&mut self, ready: Callback) -> Result<bool, LogError>;
    fn shutdown(&mut self, done: Callback) -> Result<bool, LogError>;
}
