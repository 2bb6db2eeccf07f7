//! Bounded-concurrency, rate-limited dispatch queue
//!
//! Callers produce lookup requests far faster than the remote index should
//! receive them. Every request is admitted into this queue, which executes at
//! most `max_concurrency` of them at a time and inserts a minimum spacing
//! delay before each dispatch that is driven by a completed predecessor.
//!
//! The asymmetry is deliberate: a task submitted while a slot is free starts
//! immediately, so the first couple of requests against an idle queue pay no
//! latency, while sustained load is spaced out by `min_dispatch_delay`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Tunable parameters of a [`DispatchQueue`]
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum number of simultaneously executing tasks
    pub max_concurrency: usize,

    /// Minimum spacing inserted before every completion-driven dispatch
    pub min_dispatch_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 2,
            min_dispatch_delay: Duration::from_millis(500),
        }
    }
}

/// Errors surfaced through the handle returned by [`DispatchQueue::submit`]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The task was dispatched but its outcome never arrived, which only
    /// happens if the task itself panicked.
    #[error("dispatched task was abandoned before delivering a result")]
    Abandoned,
}

/// One unit of admitted work: invoking the closure starts the task and wires
/// its outcome back to the submitter.
type WorkItem = Box<dyn FnOnce(DispatchQueue) -> BoxFuture<'static, ()> + Send>;

struct QueueState {
    pending: VecDeque<WorkItem>,
    in_flight: usize,
}

struct QueueInner {
    state: Mutex<QueueState>,
    config: QueueConfig,
}

/// FIFO queue that executes submitted futures with a concurrency ceiling and
/// an inter-dispatch delay.
///
/// Cheap to clone; clones share the same pending sequence and in-flight
/// counter. Construct one per remote endpoint and pass it to whichever
/// component needs to submit work.
#[derive(Clone)]
pub struct DispatchQueue {
    inner: Arc<QueueInner>,
}

impl DispatchQueue {
    /// Create a queue with the given limits. A zero concurrency ceiling is
    /// normalized to one so the queue can always make progress.
    pub fn new(config: QueueConfig) -> Self {
        let config = QueueConfig {
            max_concurrency: config.max_concurrency.max(1),
            ..config
        };

        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    in_flight: 0,
                }),
                config,
            }),
        }
    }

    /// Admit a task and return a handle that settles with its output.
    ///
    /// The task is appended to the FIFO pending sequence. If a concurrency
    /// slot is free at submission time the queue front starts immediately;
    /// otherwise it waits until a running task completes and the spacing
    /// delay has elapsed. Submission itself never fails.
    pub fn submit<T, F>(&self, task: F) -> impl Future<Output = Result<T, DispatchError>> + use<T, F>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let work: WorkItem = Box::new(move |queue: DispatchQueue| {
            Box::pin(async move {
                // The slot is released on drop, so a panicking task still
                // frees it and the next pending item still dispatches.
                let slot = SlotGuard { queue };

                let output = task.await;

                // Free the slot and pull the next pending item before the
                // submitter can observe the outcome, so a drained queue
                // reports idle by the time the last result is seen.
                drop(slot);

                // The submitter may have dropped its handle; the queue keeps
                // draining regardless.
                let _ = tx.send(output);
            })
        });

        {
            let mut state = self.lock_state();
            state.pending.push_back(work);
            trace!(depth = state.pending.len(), "task admitted");
        }

        // Spare capacity at submission time dispatches the queue front with
        // no added delay.
        self.try_dispatch(true);

        async move { rx.await.map_err(|_| DispatchError::Abandoned) }
    }

    /// Whether nothing is pending and nothing is executing.
    ///
    /// This is the drain signal consumers use to flip "still loading" state
    /// once every admitted task has settled.
    pub fn is_idle(&self) -> bool {
        let state = self.lock_state();
        state.pending.is_empty() && state.in_flight == 0
    }

    /// Number of admitted tasks that have not started executing yet.
    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Take the queue front and start it, unless the queue is empty or the
    /// concurrency ceiling is reached. The in-flight slot is reserved before
    /// any delay so the ceiling holds across the sleep.
    fn try_dispatch(&self, immediate: bool) {
        let work = {
            let mut state = self.lock_state();

            if state.in_flight >= self.inner.config.max_concurrency {
                return;
            }
            let Some(work) = state.pending.pop_front() else {
                return;
            };

            state.in_flight += 1;
            debug!(
                in_flight = state.in_flight,
                pending = state.pending.len(),
                immediate,
                "dispatching task"
            );
            work
        };

        let queue = self.clone();
        tokio::spawn(async move {
            if !immediate {
                tokio::time::sleep(queue.inner.config.min_dispatch_delay).await;
            }
            work(queue).await;
        });
    }

    /// Release one in-flight slot and attempt the next dispatch, always with
    /// the spacing delay.
    fn complete_one(&self) {
        {
            let mut state = self.lock_state();
            state.in_flight -= 1;
            trace!(in_flight = state.in_flight, "task completed");
        }
        self.try_dispatch(false);
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // The lock is only held for queue bookkeeping, never across an await;
        // poisoning would mean a panic inside that bookkeeping itself.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owns one reserved in-flight slot. Releasing on drop rather than on the
/// normal path alone keeps the queue draining even when a task unwinds.
struct SlotGuard {
    queue: DispatchQueue,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.queue.complete_one();
    }
}
