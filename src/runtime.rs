//! Bounded worker pool for grounding requests.
//!
//! `Grounder` is synchronous and lock-free, so callers can already share it
//! across their own threads. This runtime adds a small, bounded, thread-based
//! queue for callers that want backpressure: submission fails fast when the
//! queue is full instead of blocking.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExecutionError, GroundError, GroundResult};
use crate::grounder::{GroundQuery, Grounder};
use crate::matches::ScoredMatch;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued requests.
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

enum Job {
    Ground {
        query: GroundQuery,
        reply: Sender<Vec<ScoredMatch>>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

/// Handle to a submitted request.
#[derive(Debug)]
pub struct GroundHandle {
    rx: Receiver<Vec<ScoredMatch>>,
}

impl GroundHandle {
    /// Waits for the result.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` if the worker went away.
    pub fn join(self) -> GroundResult<Vec<ScoredMatch>> {
        self.rx
            .recv()
            .map_err(|_| GroundError::Execution(ExecutionError::Disconnected))
    }

    /// Waits for the result with a timeout.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Timeout` if no result arrives in time and
    /// `ExecutionError::Disconnected` if the worker went away.
    pub fn join_timeout(self, timeout: Duration) -> GroundResult<Vec<ScoredMatch>> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => GroundError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => GroundError::Execution(ExecutionError::Disconnected),
        })
    }
}

/// A pool of grounding workers sharing one engine.
pub struct GroundingRuntime {
    grounder: Arc<Grounder>,
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl GroundingRuntime {
    /// Starts the workers.
    ///
    /// Zero workers or zero capacity are raised to one.
    ///
    /// # Errors
    ///
    /// Returns `GroundError::Internal` if a worker thread cannot be spawned.
    pub fn new(grounder: Arc<Grounder>, config: &RuntimeConfig) -> GroundResult<Self> {
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let grounder = Arc::clone(&grounder);
            let handle = thread::Builder::new()
                .name(format!("grounder-{idx}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        match job {
                            Job::Ground { query, reply } => {
                                let _ = reply.send(grounder.execute(&query));
                            }

                            #[cfg(test)]
                            Job::Sleep { duration, reply } => {
                                thread::sleep(duration);
                                let _ = reply.send(());
                            }
                        }
                    }
                })
                .map_err(|e| GroundError::internal(format!("failed to spawn grounding worker: {e}")))?;
            handles.push(handle);
        }
        debug!(workers, queue_capacity, "grounding runtime started");

        Ok(Self {
            grounder,
            tx: Some(tx),
            workers: handles,
            queue_capacity,
        })
    }

    fn try_submit(&self, job: Job) -> GroundResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or(GroundError::Execution(ExecutionError::Disconnected))?;
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(GroundError::Execution(ExecutionError::QueueFull {
                capacity: self.queue_capacity,
            })),
            Err(TrySendError::Disconnected(_)) => Err(GroundError::Execution(ExecutionError::Disconnected)),
        }
    }

    /// Queues a request.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::QueueFull` when the queue is at capacity.
    pub fn submit(&self, query: GroundQuery) -> GroundResult<GroundHandle> {
        let (reply, rx) = bounded::<Vec<ScoredMatch>>(1);
        self.try_submit(Job::Ground { query, reply })?;
        Ok(GroundHandle { rx })
    }

    /// Queues a request and waits for it.
    ///
    /// # Errors
    ///
    /// Same as [`GroundingRuntime::submit`] and [`GroundHandle::join`].
    pub fn ground(&self, query: GroundQuery) -> GroundResult<Vec<ScoredMatch>> {
        self.submit(query)?.join()
    }

    /// Grounds a batch over the pool. Results follow input order.
    ///
    /// # Errors
    ///
    /// Fails on the first request that cannot be queued or completed.
    pub fn ground_batch(&self, queries: Vec<GroundQuery>) -> GroundResult<Vec<Vec<ScoredMatch>>> {
        let handles = queries
            .into_iter()
            .map(|q| self.submit(q))
            .collect::<GroundResult<Vec<_>>>()?;
        handles.into_iter().map(GroundHandle::join).collect()
    }

    /// The shared engine.
    #[must_use]
    pub fn grounder(&self) -> &Grounder {
        &self.grounder
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> GroundResult<Receiver<()>> {
        let (reply, rx) = bounded::<()>(1);
        self.try_submit(Job::Sleep { duration, reply })?;
        Ok(rx)
    }
}

impl Drop for GroundingRuntime {
    fn drop(&mut self) {
        // Closing the channel lets workers drain the queue and exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
