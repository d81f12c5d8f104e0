//! Background execution of the parse/segment/match pipeline
//!
//! PDF parsing time scales with document size, so a job runs as one blocking
//! task off the interactive path. Jobs are fully independent: each slot owns
//! its own cancellation flag and its own job, and abandoning one job never
//! touches another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::job::Job;
use mailsort_types::ReferenceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobStatus {
    Running,
    Finished,
    Failed,
    Cancelled,
}

enum Slot {
    Running {
        cancel: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    },
    Finished(Box<Job>),
    Failed(EngineError),
    Cancelled,
}

#[derive(Clone, Default)]
pub struct JobRunner {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // A worker can only panic between slot updates; the map stays usable
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Validate inputs and start the pipeline in the background
    ///
    /// Configuration and reference-list errors surface here, before any
    /// processing happens; extraction errors land in the job's slot.
    pub fn submit(
        &self,
        pdf: Vec<u8>,
        reference: Vec<ReferenceEntry>,
        config: EngineConfig,
    ) -> Result<String, EngineError> {
        let mut job = Job::new(pdf, reference, config)?;
        let id = job.id().to_string();
        let cancel = Arc::new(AtomicBool::new(false));

        self.lock().insert(
            id.clone(),
            Slot::Running {
                cancel: cancel.clone(),
                handle: None,
            },
        );

        let slots = self.slots.clone();
        let worker_id = id.clone();
        let worker_cancel = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let outcome = job.run_cancellable(&worker_cancel);
            let slot = if worker_cancel.load(Ordering::Relaxed) {
                Slot::Cancelled
            } else {
                match outcome {
                    Ok(()) => Slot::Finished(Box::new(job)),
                    Err(EngineError::Cancelled) => Slot::Cancelled,
                    Err(e) => {
                        tracing::warn!(job = %worker_id, error = %e, "job failed");
                        Slot::Failed(e)
                    }
                }
            };
            let mut guard = slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // A concurrent cancel may have already made the slot terminal
            if matches!(guard.get(&worker_id), Some(Slot::Running { .. })) {
                guard.insert(worker_id, slot);
            }
        });

        // The worker may have already stored a terminal slot; only attach
        // the handle if the job is still marked running
        if let Some(Slot::Running { handle: h, .. }) = self.lock().get_mut(&id) {
            *h = Some(handle);
        }

        tracing::info!(job = %id, "job submitted");
        Ok(id)
    }

    /// Abandon an in-flight job; returns false if it already completed
    pub fn cancel(&self, id: &str) -> bool {
        let mut slots = self.lock();
        if !matches!(slots.get(id), Some(Slot::Running { .. })) {
            return false;
        }
        if let Some(Slot::Running { cancel, handle }) = slots.remove(id) {
            cancel.store(true, Ordering::Relaxed);
            if let Some(handle) = handle {
                // Stops the task if it has not started yet; a running task
                // notices the flag at its next stage boundary
                handle.abort();
            }
            slots.insert(id.to_string(), Slot::Cancelled);
            tracing::info!(job = %id, "job cancelled");
            true
        } else {
            false
        }
    }

    pub fn status(&self, id: &str) -> Option<JobStatus> {
        self.lock().get(id).map(|slot| match slot {
            Slot::Running { .. } => JobStatus::Running,
            Slot::Finished(_) => JobStatus::Finished,
            Slot::Failed(_) => JobStatus::Failed,
            Slot::Cancelled => JobStatus::Cancelled,
        })
    }

    /// Wait until the job's background work has ended
    pub async fn wait(&self, id: &str) {
        let handle = match self.lock().get_mut(id) {
            Some(Slot::Running { handle, .. }) => handle.take(),
            _ => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Take a completed job out of the runner for review
    ///
    /// Returns None while the job is still running or unknown; terminal
    /// slots are consumed.
    pub fn take(&self, id: &str) -> Option<Result<Job, EngineError>> {
        let mut slots = self.lock();
        match slots.get(id) {
            Some(Slot::Running { .. }) | None => return None,
            _ => {}
        }
        match slots.remove(id) {
            Some(Slot::Finished(job)) => Some(Ok(*job)),
            Some(Slot::Failed(e)) => Some(Err(e)),
            Some(Slot::Cancelled) => Some(Err(EngineError::Cancelled)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use mailsort_pdf::testpdf::pdf_with_page_texts;
    use mailsort_types::MailCategory;

    fn reference() -> Vec<ReferenceEntry> {
        vec![ReferenceEntry {
            canonical_name: "Acme Corp".to_string(),
            aliases: Vec::new(),
            category: MailCategory::DoNotMail,
        }]
    }

    #[tokio::test]
    async fn test_submit_wait_take() {
        let runner = JobRunner::new();
        let pdf = pdf_with_page_texts(&["ACME CORP\nAccount Statement"]);
        let id = runner.submit(pdf, reference(), EngineConfig::default()).unwrap();

        runner.wait(&id).await;
        assert_eq!(runner.status(&id), Some(JobStatus::Finished));

        let job = runner.take(&id).unwrap().unwrap();
        assert_eq!(job.state(), JobState::Finalizable);
        // Consumed: a second take finds nothing
        assert!(runner.take(&id).is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_synchronously() {
        let runner = JobRunner::new();
        let config = EngineConfig::default().with_auto_threshold(2.0);
        let result = runner.submit(Vec::new(), reference(), config);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_garbage_pdf_fails_in_background() {
        let runner = JobRunner::new();
        let id = runner
            .submit(b"not a pdf".to_vec(), reference(), EngineConfig::default())
            .unwrap();
        runner.wait(&id).await;
        assert_eq!(runner.status(&id), Some(JobStatus::Failed));
        assert!(matches!(
            runner.take(&id),
            Some(Err(EngineError::Extraction(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let runner = JobRunner::new();
        assert_eq!(runner.status("nope"), None);
        assert!(runner.take("nope").is_none());
        assert!(!runner.cancel("nope"));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_returns_false() {
        let runner = JobRunner::new();
        let pdf = pdf_with_page_texts(&["ACME CORP\nAccount Statement"]);
        let id = runner.submit(pdf, reference(), EngineConfig::default()).unwrap();
        runner.wait(&id).await;
        assert!(!runner.cancel(&id));
    }

    #[tokio::test]
    async fn test_cancelled_job_yields_cancelled_error() {
        let runner = JobRunner::new();
        let pdf = pdf_with_page_texts(&["ACME CORP\nAccount Statement"]);
        let id = runner.submit(pdf, reference(), EngineConfig::default()).unwrap();

        let cancelled = runner.cancel(&id);
        runner.wait(&id).await;

        if cancelled {
            assert_eq!(runner.status(&id), Some(JobStatus::Cancelled));
            assert!(matches!(
                runner.take(&id),
                Some(Err(EngineError::Cancelled))
            ));
        }
    }
}
