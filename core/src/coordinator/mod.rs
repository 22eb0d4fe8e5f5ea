//! Bootstrap/shutdown coordinator.
//!
//! Brings logging up, runs the single blocking [`Runner`], brings logging
//! down and then asks the execution context to stop. Both log transitions go
//! through one [`Completion`](crate::logging::Completion) regardless of
//! whether the subsystem finished inline or will call back later.
//!
//! The coordinator is consumed by [`Coordinator::start`]; the returned future
//! owns it and drops it once the terminal phase is reached.

mod phase;

pub use phase::{validate, Phase};

use crate::context::Terminate;
use crate::error::{ExtractError, FatalFault};
use crate::logging::{self, CallbackRole, LogSubsystem};
use crate::runner::Runner;

pub struct Coordinator<C, L> {
    phase: Phase,
    runner: Option<Box<dyn Runner>>,
    context: C,
    log: L,
}

impl<C, L> Coordinator<C, L>
where
    C: Terminate,
    L: LogSubsystem,
{
    pub fn new(context: C, runner: Box<dyn Runner>, log: L) -> Self {
        Self {
            phase: Phase::Created,
            runner: Some(runner),
            context,
            log,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive the whole sequence. Completes without suspending when the log
    /// subsystem finishes both transitions inline.
    ///
    /// A runner failure is returned as-is and logging is left up: the caller
    /// is expected to fail fast.
    pub async fn start(mut self) -> Result<Phase, ExtractError> {
        self.transition(CallbackRole::Ready).await?;

        self.advance(Phase::Running)?;
        let runner = self.runner.take().ok_or(FatalFault::RunnerConsumed)?;
        let started = chrono::Utc::now();
        runner.run()?;
        tracing::info!(
            elapsed_ms = (chrono::Utc::now() - started).num_milliseconds(),
            "runner finished"
        );

        self.transition(CallbackRole::ShutdownComplete).await?;

        self.advance(Phase::Terminated)?;
        self.context.request_shutdown();
        Ok(self.phase)
    }

    async fn transition(&mut self, role: CallbackRole) -> Result<(), ExtractError> {
        let (callback, completion) = logging::pair(role);
        let inline = match role {
            CallbackRole::Ready => {
                self.advance(Phase::LoggingUp)?;
                self.log.start(callback)?
            }
            CallbackRole::ShutdownComplete => {
                self.advance(Phase::LoggingDown)?;
                self.log.shutdown(callback)?
            }
        };
        completion.settle(inline).await?;
        tracing::debug!(%role, inline, "log transition complete");
        Ok(())
    }

    fn advance(&mut self, to: Phase) -> Result<(), FatalFault> {
        validate(self.phase, to)?;
        tracing::debug!(from = ?self.phase, to = ?to, "{}", to.description());
        self.phase = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use crate::logging::Callback;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<&'static str>>>;

    const FULL_RUN: [&str; 4] = ["log.start", "run", "log.shutdown", "terminate"];

    struct StubLog {
        start_inline: bool,
        shutdown_inline: bool,
        drop_deferred: bool,
        trace: Trace,
        pending: Rc<RefCell<VecDeque<Callback>>>,
        spent: Rc<RefCell<Vec<Callback>>>,
    }

    impl StubLog {
        fn hold(&self, callback: Callback, inline: bool) -> Result<bool, LogError> {
            if inline {
                self.spent.borrow_mut().push(callback);
            } else if !self.drop_deferred {
                self.pending.borrow_mut().push_back(callback);
            }
            Ok(inline)
        }
    }

    impl LogSubsystem for StubLog {
        fn start(&mut self, ready: Callback) -> Result<bool, LogError> {
            self.trace.borrow_mut().push("log.start");
            self.hold(ready, self.start_inline)
        }

        fn shutdown(&mut self, done: Callback) -> Result<bool, LogError> {
            self.trace.borrow_mut().push("log.shutdown");
            self.hold(done, self.shutdown_inline)
        }
    }

    struct StubRunner {
        trace: Trace,
        fail: bool,
    }

    impl Runner for StubRunner {
        fn run(self: Box<Self>) -> Result<(), ExtractError> {
            self.trace.borrow_mut().push("run");
            if self.fail {
                return Err(anyhow::anyhow!("truncated extent").into());
            }
            Ok(())
        }
    }

    struct StubContext {
        trace: Trace,
    }

    impl Terminate for StubContext {
        fn request_shutdown(&self) {
            self.trace.borrow_mut().push("terminate");
        }
    }

    #[derive(Default)]
    struct Harness {
        trace: Trace,
        pending: Rc<RefCell<VecDeque<Callback>>>,
        spent: Rc<RefCell<Vec<Callback>>>,
    }

    impl Harness {
        fn coordinator(
            &self,
            start_inline: bool,
            shutdown_inline: bool,
        ) -> Coordinator<StubContext, StubLog> {
            self.build(start_inline, shutdown_inline, false, false)
        }

        fn build(
            &self,
            start_inline: bool,
            shutdown_inline: bool,
            drop_deferred: bool,
            fail_runner: bool,
        ) -> Coordinator<StubContext, StubLog> {
            let log = StubLog {
                start_inline,
                shutdown_inline,
                drop_deferred,
                trace: Rc::clone(&self.trace),
                pending: Rc::clone(&self.pending),
                spent: Rc::clone(&self.spent),
            };
            let runner = StubRunner {
                trace: Rc::clone(&self.trace),
                fail: fail_runner,
            };
            let context = StubContext {
                trace: Rc::clone(&self.trace),
            };
            Coordinator::new(context, Box::new(runner), log)
        }

        fn trace(&self) -> Vec<&'static str> {
            self.trace.borrow().clone()
        }

        fn next_pending(&self) -> Callback {
            self.pending
                .borrow_mut()
                .pop_front()
                .expect("coordinator suspended without a pending callback")
        }
    }

    /// Poll to completion, firing deferred callbacks whenever the coordinator suspends.
    fn drive(start_inline: bool, shutdown_inline: bool) -> (Phase, Vec<&'static str>, usize) {
        let harness = Harness::default();
        let mut fut = Box::pin(harness.coordinator(start_inline, shutdown_inline).start());
        let mut suspensions = 0;
        loop {
            if let Some(result) = (&mut fut).now_or_never() {
                return (result.unwrap(), harness.trace(), suspensions);
            }
            suspensions += 1;
            harness.next_pending().complete().unwrap();
        }
    }

    #[test]
    fn test_new_coordinator_is_created() {
        let harness = Harness::default();
        assert_eq!(harness.coordinator(true, true).phase(), Phase::Created);
    }

    #[test]
    fn test_sync_path_completes_in_single_call() {
        let harness = Harness::default();
        let phase = harness
            .coordinator(true, true)
            .start()
            .now_or_never()
            .expect("inline completion must not suspend")
            .unwrap();

        assert_eq!(phase, Phase::Terminated);
        assert_eq!(harness.trace(), FULL_RUN);
    }

    #[test]
    fn test_async_path_waits_for_each_callback() {
        let harness = Harness::default();
        let mut fut = Box::pin(harness.coordinator(false, false).start());

        assert!((&mut fut).now_or_never().is_none());
        assert_eq!(harness.trace(), ["log.start"]);

        harness.next_pending().complete().unwrap();
        assert!((&mut fut).now_or_never().is_none());
        assert_eq!(harness.trace(), ["log.start", "run", "log.shutdown"]);

        harness.next_pending().complete().unwrap();
        let phase = (&mut fut).now_or_never().expect("done").unwrap();
        assert_eq!(phase, Phase::Terminated);
        assert_eq!(harness.trace(), FULL_RUN);
        assert!(harness.pending.borrow().is_empty());
    }

    #[test]
    fn test_every_completion_mix_ends_identically() {
        let mut suspensions = Vec::new();
        for (start_inline, shutdown_inline) in
            [(true, true), (false, false), (true, false), (false, true)]
        {
            let (phase, trace, suspended) = drive(start_inline, shutdown_inline);
            assert_eq!(phase, Phase::Terminated);
            assert_eq!(trace, FULL_RUN);
            suspensions.push(suspended);
        }
        assert_eq!(suspensions, [0, 2, 1, 1]);
    }

    #[test]
    fn test_repeated_ready_callback_is_fatal() {
        let harness = Harness::default();
        let mut fut = Box::pin(harness.coordinator(false, false).start());
        assert!((&mut fut).now_or_never().is_none());

        let ready = harness.next_pending();
        ready.complete().unwrap();
        assert!((&mut fut).now_or_never().is_none());

        assert!(matches!(
            ready.complete(),
            Err(FatalFault::RepeatedCallback(CallbackRole::Ready))
        ));
        assert_eq!(harness.trace().iter().filter(|e| **e == "run").count(), 1);
    }

    #[test]
    fn test_callback_after_inline_completion_is_fatal() {
        let harness = Harness::default();
        harness
            .coordinator(true, true)
            .start()
            .now_or_never()
            .unwrap()
            .unwrap();

        let spent = harness.spent.borrow();
        assert_eq!(spent.len(), 2);
        assert!(matches!(
            spent[0].complete(),
            Err(FatalFault::UnexpectedCallback(CallbackRole::Ready))
        ));
        assert!(matches!(
            spent[1].complete(),
            Err(FatalFault::UnexpectedCallback(CallbackRole::ShutdownComplete))
        ));
    }

    #[test]
    fn test_dropped_ready_callback_never_runs_work() {
        let harness = Harness::default();
        let result = harness
            .build(false, false, true, false)
            .start()
            .now_or_never()
            .expect("dropped callback resolves immediately");

        assert!(matches!(
            result,
            Err(ExtractError::Fatal(FatalFault::CallbackDropped(
                CallbackRole::Ready
            )))
        ));
        assert_eq!(harness.trace(), ["log.start"]);
    }

    #[test]
    fn test_runner_failure_bypasses_log_shutdown() {
        let harness = Harness::default();
        let result = harness
            .build(true, true, false, true)
            .start()
            .now_or_never()
            .unwrap();

        assert!(matches!(result, Err(ExtractError::Dump(_))));
        assert_eq!(harness.trace(), ["log.start", "run"]);
    }

    #[test]
    fn test_failed_log_start_never_runs_work() {
        let harness = Harness::default();
        let mut fut = Box::pin(harness.coordinator(false, true).start());
        assert!((&mut fut).now_or_never().is_none());

        harness
            .next_pending()
            .fail(LogError::Flush("sink closed".into()))
            .unwrap();
        let result = (&mut fut).now_or_never().unwrap();
        assert!(matches!(result, Err(ExtractError::Log(_))));
        assert_eq!(harness.trace(), ["log.start"]);
    }
}
