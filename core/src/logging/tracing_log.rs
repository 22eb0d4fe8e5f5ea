use std::cell::RefCell;
use std::rc::Rc;

use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{FatalFault, LogError};
use crate::fault;

use super::{mark_stderr, Callback, LogSubsystem};

/// The thread default subscriber, plus whether it writes to stderr.
struct Scope {
    _guard: DefaultGuard,
}

impl Scope {
    fn enter<S>(subscriber: S, stderr: bool) -> Self
    where
        S: tracing::Subscriber + Send + Sync + 'static,
    {
        let guard = tracing::subscriber::set_default(subscriber);
        mark_stderr(stderr);
        Self { _guard: guard }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        mark_stderr(false);
    }
}

#[derive(Default)]
struct Installed {
    scope: Option<Scope>,
    flush: Option<WorkerGuard>,
}

/// `tracing` backed [`LogSubsystem`].
///
/// The subscriber is installed as the worker thread's default for as long as
/// the subsystem is up, so it must be driven from a `LocalSet` on that worker.
/// Starting against stderr completes inline; opening a log file and flushing
/// on shutdown complete later through the callback.
pub struct TracingLog {
    config: LoggingConfig,
    state: Rc<RefCell<Installed>>,
}

impl TracingLog {
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            state: Rc::new(RefCell::new(Installed::default())),
        }
    }

    pub fn is_up(&self) -> bool {
        self.state.borrow().scope.is_some()
    }

    fn filter(&self) -> Result<EnvFilter, LogError> {
        EnvFilter::try_new(&self.config.filter).map_err(|e| LogError::Filter {
            filter: self.config.filter.clone(),
            reason: e.to_string(),
        })
    }
}

fn install(
    state: &RefCell<Installed>,
    filter: EnvFilter,
    writer: NonBlocking,
    flush: WorkerGuard,
    ansi: bool,
    stderr: bool,
) {
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi),
    );
    let scope = Scope::enter(subscriber, stderr);

    let mut state = state.borrow_mut();
    state.scope = Some(scope);
    state.flush = Some(flush);
}

fn report(outcome: Result<(), FatalFault>) {
    if let Err(fault) = outcome {
        fault::fail_fast(&fault.into());
    }
}

impl LogSubsystem for TracingLog {
    fn start(&mut self, ready: Callback) -> Result<bool, LogError> {
        let filter = self.filter()?;

        let Some(path) = self.config.file.clone() else {
            let (writer, flush) = tracing_appender::non_blocking(std::io::stderr());
            install(&self.state, filter, writer, flush, self.config.ansi, true);
            return Ok(true);
        };

        let state = Rc::clone(&self.state);
        tokio::task::spawn_local(async move {
            let opened = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await;
            let outcome = match opened {
                Ok(file) => {
                    let (writer, flush) = tracing_appender::non_blocking(file.into_std().await);
                    install(&state, filter, writer, flush, false, false);
                    ready.complete()
                }
                Err(source) => ready.fail(LogError::Open { path, source }),
            };
            report(outcome);
        });

        Ok(false)
    }

    fn shutdown(&mut self, done: Callback) -> Result<bool, LogError> {
        tracing::debug!("log subsystem shutting down");

        let (scope, flush) = {
            let mut state = self.state.borrow_mut();
            (state.scope.take(), state.flush.take())
        };
        drop(scope);

        let Some(flush) = flush else {
            return Ok(true);
        };

        // Dropping the guard blocks until the writer thread drains.
        tokio::task::spawn_local(async move {
            let outcome = match tokio::task::spawn_blocking(move || drop(flush)).await {
                Ok(()) => done.complete(),
                Err(e) => done.fail(LogError::Flush(e.to_string())),
            };
            report(outcome);
        });

        Ok(false)
    }
}
