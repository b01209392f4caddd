//! FIFO playback request queue with a single blocking consumer.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::foundation::error::{TalkheadError, TalkheadResult};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// One request to play a generated video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    /// Process-unique id, increasing in creation order.
    pub id: u64,
    /// Path to the generated video.
    pub path: PathBuf,
}

impl Job {
    /// Create a job for `path` with a fresh id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            path: path.into(),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

/// Ordered queue of pending jobs.
///
/// Producers append in the order generation *completes*, not the order text was submitted.
#[derive(Debug, Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl RequestQueue {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job. Fails once the queue is closed.
    pub fn enqueue(&self, job: Job) -> TalkheadResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TalkheadError::validation(format!(
                "queue is closed; dropping job {} ({})",
                job.id,
                job.path.display()
            )));
        }
        tracing::info!(job = job.id, path = %job.path.display(), "job enqueued");
        state.jobs.push_back(job);
        self.ready.notify_one();
        Ok(())
    }

    /// Block until a job is available and pop it; `None` once the queue is closed.
    pub fn pop_blocking(&self) -> Option<Job> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            self.ready.wait(&mut state);
        }
    }

    /// Close the queue, wake the consumer, and return the jobs that will never play.
    pub fn close(&self) -> Vec<Job> {
        let mut state = self.state.lock();
        state.closed = true;
        self.ready.notify_all();
        state.jobs.drain(..).collect()
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    /// Return `true` when no job is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn the single consumer. `handler` runs synchronously for each job, so the next job is not
/// popped until the previous one has fully finished.
pub fn spawn_worker<F>(queue: Arc<RequestQueue>, mut handler: F) -> TalkheadResult<JoinHandle<()>>
where
    F: FnMut(Job) + Send + 'static,
{
    std::thread::Builder::new()
        .name("playback-worker".to_string())
        .spawn(move || {
            tracing::info!("playback worker started");
            while let Some(job) = queue.pop_blocking() {
                handler(job);
            }
            tracing::info!("playback worker stopped");
        })
        .map_err(|e| TalkheadError::Other(anyhow::Error::new(e).context("spawn playback worker")))
}

#[cfg(test)]
#[path = "../tests/unit/queue.rs"]
mod tests;
