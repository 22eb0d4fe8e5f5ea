//! Cooperative execution context.
//!
//! Each worker is a single-threaded run-queue; tasks posted to a worker run
//! on it as `!Send` local tasks and never concurrently with one another.
//! Worker 0 runs on the thread that calls [`ExecutionContext::run`].

mod worker;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, watch};

use crate::error::{ExtractError, FatalFault};

use worker::Worker;

pub type Task = Box<dyn FnOnce(ContextHandle) -> LocalBoxFuture<'static, ()> + Send>;

/// Something that can be asked to stop once its work has drained.
pub trait Terminate {
    fn request_shutdown(&self);
}

/// Non-owning reference to an [`ExecutionContext`].
#[derive(Clone)]
pub struct ContextHandle {
    queues: Arc<[mpsc::UnboundedSender<Task>]>,
    shutdown: Arc<watch::Sender<bool>>,
    requests: Arc<AtomicUsize>,
}

impl ContextHandle {
    pub fn workers(&self) -> usize {
        self.queues.len()
    }

    pub fn post<F, Fut>(&self, worker: usize, task: F) -> Result<(), FatalFault>
    where
        F: FnOnce(ContextHandle) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        if self.shutdown_requested() {
            return Err(FatalFault::WorkerClosed(worker));
        }
        let queue = self
            .queues
            .get(worker)
            .ok_or(FatalFault::WorkerClosed(worker))?;
        let task: Task = Box::new(move |handle| task(handle).boxed_local());
        queue
            .send(task)
            .map_err(|_| FatalFault::WorkerClosed(worker))
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// How many times shutdown has been requested.
    pub fn shutdown_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Terminate for ContextHandle {
    fn request_shutdown(&self) {
        let previous = self.requests.fetch_add(1, Ordering::SeqCst);
        if previous > 0 {
            tracing::warn!(requests = previous + 1, "shutdown requested again");
        }
        self.shutdown.send_replace(true);
    }
}

pub struct ExecutionContext {
    handle: ContextHandle,
    workers: Vec<Worker>,
}

impl ExecutionContext {
    pub fn new(workers: usize) -> Result<Self, FatalFault> {
        if workers == 0 {
            return Err(FatalFault::NoWorkers);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..workers).map(|_| mpsc::unbounded_channel()).unzip();

        let handle = ContextHandle {
            queues: senders.into(),
            shutdown: Arc::new(shutdown_tx),
            requests: Arc::new(AtomicUsize::new(0)),
        };

        let workers = receivers
            .into_iter()
            .enumerate()
            .map(|(index, queue)| Worker {
                index,
                queue,
                shutdown: shutdown_rx.clone(),
                handle: handle.clone(),
            })
            .collect();

        Ok(Self { handle, workers })
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    /// Seed worker 0 with the first unit of work.
    pub fn post_initial<F, Fut>(&self, task: F) -> Result<(), FatalFault>
    where
        F: FnOnce(ContextHandle) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.handle.post(0, task)
    }

    /// Run every worker until shutdown is requested and all posted work has drained.
    pub fn run(self) -> Result<(), ExtractError> {
        let handle = self.handle;
        let mut workers = self.workers.into_iter();
        let primary = workers.next().ok_or(FatalFault::NoWorkers)?;

        let mut threads = Vec::new();
        for worker in workers {
            let index = worker.index;
            let thread = std::thread::Builder::new()
                .name(format!("dbextract-worker-{index}"))
                .spawn(move || worker.run())?;
            threads.push((index, thread));
        }

        let result = primary.run();
        if result.is_err() {
            handle.request_shutdown();
        }

        for (index, thread) in threads {
            thread
                .join()
                .map_err(|_| FatalFault::WorkerPanicked(index))??;
        }

        result
    }
}
