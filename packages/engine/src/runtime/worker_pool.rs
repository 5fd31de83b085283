// packages/engine/src/runtime/worker_pool.rs
//! Bounded worker pool for agent pipelines
//!
//! Pipelines are synchronous, so each job runs on tokio's reusable blocking
//! thread pool. A semaphore bounds how many jobs execute at once; a job keeps
//! its permit until it returns, even if the caller stopped waiting for it.
//!
//! A [`Job`] that is still waiting for a permit can be cancelled with
//! [`Job::cancel_if_queued`]; once it has started it always runs to the end.
//!
//! # Architecture
//!
//! ```text
//! spawn(job) ─→ async task ─→ acquire permit ─→ spawn_blocking(job)
//!                   │              │                    │
//!          cancel_if_queued  (backpressure)      permit released
//!            (aborts here)                        when job returns
//! ```

use crate::utils::config::DEFAULT_MAX_CONCURRENT_AGENTS;
use crate::utils::errors::{EngineError, Result};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

/// Worker pool owned by one environment
#[derive(Debug)]
pub struct WorkerPool {
    /// Maximum number of jobs executing at once
    max_concurrent: usize,

    /// Execution permits
    permits: Arc<Semaphore>,

    /// Jobs handed to the pool since creation
    dispatched: AtomicU64,
}

impl WorkerPool {
    /// Create a pool running at most `max_concurrent` jobs at once
    pub fn new(max_concurrent: usize) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(EngineError::InvalidArgument(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        Ok(Self::build(max_concurrent))
    }

    fn build(max_concurrent: usize) -> Self {
        info!("Initializing worker pool with {} workers", max_concurrent);

        Self {
            max_concurrent,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Schedule a blocking job; must be called from within a tokio runtime
    ///
    /// The returned [`Job`] resolves once the job has run. A panic inside the
    /// job resolves to [`EngineError::AgentPanicked`] instead of unwinding
    /// into the caller.
    pub fn spawn<T, F>(&self, job: F) -> Result<Job<T>>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.permits.is_closed() {
            return Err(EngineError::WorkerPoolClosed);
        }

        self.dispatched.fetch_add(1, Ordering::Relaxed);
        let permits = Arc::clone(&self.permits);
        let state = Arc::new(AtomicU8::new(JOB_QUEUED));
        let job_state = Arc::clone(&state);

        let handle = tokio::spawn(async move {
            // Wait for a free worker (backpressure)
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| EngineError::WorkerPoolClosed)?;

            tokio::task::spawn_blocking(move || {
                let _permit = permit;

                // Lost the race against cancel_if_queued: never run
                if job_state
                    .compare_exchange(JOB_QUEUED, JOB_RUNNING, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    return Err(EngineError::JobCancelled);
                }

                job()
            })
            .await
            .map_err(join_error)?
        });

        Ok(Job { handle, state })
    }

    /// Stop accepting jobs; jobs already running finish normally
    pub fn shutdown(&self) {
        if !self.permits.is_closed() {
            debug!("Closing worker pool");
            self.permits.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let available = self.permits.available_permits().min(self.max_concurrent);

        PoolStats {
            max_concurrent: self.max_concurrent,
            available_workers: available,
            busy_workers: self.max_concurrent - available,
            jobs_dispatched: self.dispatched.load(Ordering::Relaxed),
            closed: self.permits.is_closed(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::build(DEFAULT_MAX_CONCURRENT_AGENTS)
    }
}

const JOB_QUEUED: u8 = 0;
const JOB_RUNNING: u8 = 1;
const JOB_CANCELLED: u8 = 2;

/// Handle to a job scheduled on a [`WorkerPool`]
///
/// Awaiting it yields the job's result. Dropping it detaches the job.
#[derive(Debug)]
pub struct Job<T> {
    handle: JoinHandle<Result<T>>,
    state: Arc<AtomicU8>,
}

impl<T> Job<T> {
    /// Whether the job got a worker and began running
    pub fn has_started(&self) -> bool {
        self.state.load(Ordering::Acquire) == JOB_RUNNING
    }

    /// Cancel the job if it is still waiting for a worker
    ///
    /// Returns `true` when the job was cancelled; it will never run and its
    /// closure is dropped. Returns `false` when it already started, in which
    /// case it keeps its worker until it returns.
    pub fn cancel_if_queued(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(JOB_QUEUED, JOB_CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if cancelled {
            self.handle.abort();
        }

        cancelled
    }
}

impl<T> Future for Job<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.map_err(join_error).and_then(|result| result))
    }
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub max_concurrent: usize,
    pub available_workers: usize,
    pub busy_workers: usize,
    pub jobs_dispatched: u64,
    pub closed: bool,
}

fn join_error(err: JoinError) -> EngineError {
    if err.is_panic() {
        EngineError::AgentPanicked(panic_message(err.into_panic()))
    } else {
        EngineError::JobCancelled
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
