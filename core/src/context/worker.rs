use tokio::sync::{mpsc, watch};
use tokio::task::LocalSet;

use crate::error::ExtractError;

use super::{ContextHandle, Task};

/// One single-threaded run-queue: a current-thread runtime plus a `LocalSet`.
pub(super) struct Worker {
    pub(super) index: usize,
    pub(super) queue: mpsc::UnboundedReceiver<Task>,
    pub(super) shutdown: watch::Receiver<bool>,
    pub(super) handle: ContextHandle,
}

impl Worker {
    pub(super) fn run(mut self) -> Result<(), ExtractError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let local = LocalSet::new();

        tracing::debug!(worker = self.index, "worker started");

        local.block_on(&runtime, async {
            loop {
                tokio::select! {
                    biased;
                    task = self.queue.recv() => match task {
                        Some(task) => {
                            tokio::task::spawn_local(task(self.handle.clone()));
                        }
                        None => break,
                    },
                    _ = self.shutdown.wait_for(|stop| *stop) => break,
                }
            }
        });

        // Drain whatever was posted before the stop request, then every local task.
        self.queue.close();
        while let Ok(task) = self.queue.try_recv() {
            local.spawn_local(task(self.handle.clone()));
        }
        runtime.block_on(local);

        tracing::debug!(worker = self.index, "worker stopped");
        Ok(())
    }
}
