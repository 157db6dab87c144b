use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{JobQueue, JobSnapshot, QueueError};

/// In-memory job queue for tests.
/// Tracks lookup calls for assertions.
#[derive(Default)]
pub struct MockJobQueue {
    jobs: Mutex<HashMap<String, JobSnapshot>>,
    calls: AtomicUsize,
}

#[allow(clippy::expect_used)]
impl MockJobQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: JobSnapshot) {
        self.jobs
            .lock()
            .expect("lock poisoned")
            .insert(job.id.clone(), job);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl JobQueue for MockJobQueue {
    async fn job(&self, job_id: &str) -> Result<Option<JobSnapshot>, QueueError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.jobs.lock().expect("lock poisoned").get(job_id).cloned())
    }
}
