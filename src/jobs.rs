//! Asynchronous validation jobs.
//!
//! A job is identified by the content fingerprint of its file, making
//! submission idempotent: re-submitting identical bytes attaches to the
//! existing job instead of enqueueing new work. Each submission runs as
//! one blocking task; failures are captured into the job record and a
//! later submission of the same content retries a FAILED job.

use crate::error::{Result, ValidationError};
use crate::fingerprint::fingerprint_bytes;
use crate::report::ValidationReport;
use crate::service::ValidationService;
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use log::{error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Lifecycle of a validation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the documented state machine allows this edge.
    ///
    /// PENDING → PROCESSING → {COMPLETED, FAILED}; FAILED → PROCESSING
    /// on retry. Everything else is rejected.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
                | (JobStatus::Failed, JobStatus::Processing)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// The tracking record for one asynchronous validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Content fingerprint, doubling as the job identity
    pub job_id: String,
    pub filename: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Set on the transition into a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Report summary, set only on COMPLETED
    pub report: Option<ValidationReport>,
    /// Failure message, set only on FAILED
    pub error_message: Option<String>,
}

impl Job {
    /// A fresh PENDING job.
    pub fn create(job_id: String, filename: String) -> Self {
        Job {
            job_id,
            filename,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            report: None,
            error_message: None,
        }
    }

    /// Moves the job along the state machine, stamping the completion
    /// time on terminal transitions. Undocumented edges are rejected.
    pub fn transition(mut self, next: JobStatus) -> Result<Job> {
        if !self.status.can_transition_to(next) {
            return Err(ValidationError::Unexpected(format!(
                "illegal job transition {:?} -> {:?} for job {}",
                self.status, next, self.job_id
            )));
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(self)
    }

    /// Completes the job with a report summary (details stay in the
    /// violation store).
    pub fn completed(self, report: ValidationReport) -> Result<Job> {
        let mut job = self.transition(JobStatus::Completed)?;
        job.report = Some(report.summary_only());
        Ok(job)
    }

    /// Fails the job with a captured error message.
    pub fn failed(self, message: String) -> Result<Job> {
        let mut job = self.transition(JobStatus::Failed)?;
        job.error_message = Some(message);
        Ok(job)
    }
}

/// Manages job records and background execution of validation runs.
///
/// Submissions carry the file content as an owned buffer; a retry of a
/// FAILED job re-reads from the buffer passed with the retrying
/// submission, never from a previously consumed stream.
pub struct JobService {
    validation: Arc<ValidationService>,
    job_store: Arc<dyn JobStore>,
    accepting: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JobService {
    pub fn new(validation: Arc<ValidationService>, job_store: Arc<dyn JobStore>) -> Self {
        JobService {
            validation,
            job_store,
            accepting: AtomicBool::new(true),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Submits a file for background validation.
    ///
    /// Idempotent per content fingerprint: an existing COMPLETED,
    /// PENDING or PROCESSING job is returned unchanged with no new work
    /// enqueued; a FAILED job is moved back to PROCESSING and re-run.
    pub fn submit(
        &self,
        filename: &str,
        content: Vec<u8>,
        content_type: &str,
        file_size: u64,
    ) -> Result<Job> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ValidationError::Unexpected(
                "job executor is shutting down, not accepting new submissions".to_string(),
            ));
        }

        let fingerprint = fingerprint_bytes(&content);

        if let Some(job) = self.job_store.find(&fingerprint) {
            return match job.status {
                JobStatus::Completed | JobStatus::Pending | JobStatus::Processing => {
                    info!(
                        "Job {} exists with status {:?}, returning existing job",
                        fingerprint, job.status
                    );
                    Ok(job)
                }
                JobStatus::Failed => {
                    info!("Job {} exists with status FAILED, retrying", fingerprint);
                    let retried = job.transition(JobStatus::Processing)?;
                    self.job_store.save(retried.clone());
                    self.enqueue(fingerprint, filename, content, content_type, file_size);
                    Ok(retried)
                }
            };
        }

        let job = Job::create(fingerprint.clone(), filename.to_string());
        self.job_store.save(job.clone());
        info!("Created new job with fingerprint: {}", fingerprint);

        self.enqueue(fingerprint, filename, content, content_type, file_size);
        Ok(job)
    }

    /// Looks up a job by its identifier.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.job_store.find(job_id)
    }

    fn enqueue(
        &self,
        job_id: String,
        filename: &str,
        content: Vec<u8>,
        content_type: &str,
        file_size: u64,
    ) {
        let validation = self.validation.clone();
        let job_store = self.job_store.clone();
        let filename = filename.to_string();
        let content_type = content_type.to_string();

        let handle = tokio::task::spawn_blocking(move || {
            process_job(
                validation.as_ref(),
                job_store.as_ref(),
                &job_id,
                content,
                &content_type,
                &filename,
                file_size,
            );
        });

        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Stops accepting new submissions, waits up to `grace` for in-flight
    /// jobs, then cancels what remains.
    ///
    /// A blocking task that already started keeps running to its own
    /// completion or failure; cancellation only prevents tasks that have
    /// not started yet.
    pub async fn shutdown(&self, grace: Duration) {
        self.accepting.store(false, Ordering::SeqCst);

        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        info!(
            "Shutting down job executor, draining {} task(s)",
            handles.len()
        );

        let deadline = tokio::time::Instant::now() + grace;
        for handle in handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout_at(deadline, handle).await.is_err() {
                error!("Job task did not finish within the grace period, cancelling");
                abort.abort();
            }
        }
    }
}

/// Background execution of one submission. Errors are captured into the
/// job record and never propagate past the task boundary.
fn process_job(
    validation: &ValidationService,
    job_store: &dyn JobStore,
    job_id: &str,
    content: Vec<u8>,
    content_type: &str,
    filename: &str,
    file_size: u64,
) {
    mark_processing(job_store, job_id);

    let mut cursor = Cursor::new(content);
    match validation.validate_and_store(&mut cursor, content_type, filename, file_size) {
        Ok((report, fingerprint)) => {
            info!(
                "Stored validation report with fingerprint: {} for job: {} ({} errors)",
                fingerprint, job_id, report.error_count
            );
            complete(job_store, job_id, report);
        }
        Err(ValidationError::Parse(message)) => {
            error!("Parse error for job {}: {}", job_id, message);
            fail(job_store, job_id, format!("Failed to parse file: {}", message));
        }
        Err(e) => {
            error!("Unexpected error processing job {}: {}", job_id, e);
            fail(
                job_store,
                job_id,
                format!("An error occurred during validation: {}", e),
            );
        }
    }
}

fn mark_processing(job_store: &dyn JobStore, job_id: &str) {
    if let Some(job) = job_store.find(job_id) {
        // Retried jobs were already moved to PROCESSING at submit time
        if job.status == JobStatus::Pending {
            match job.transition(JobStatus::Processing) {
                Ok(updated) => job_store.save(updated),
                Err(e) => error!("Failed to mark job {} as processing: {}", job_id, e),
            }
        }
    }
}

fn complete(job_store: &dyn JobStore, job_id: &str, report: ValidationReport) {
    match job_store.find(job_id) {
        Some(job) => match job.completed(report) {
            Ok(updated) => {
                job_store.save(updated);
                info!("Validation job {} completed successfully", job_id);
            }
            Err(e) => error!("Failed to complete job {}: {}", job_id, e),
        },
        None => error!("Job not found on completion: {}", job_id),
    }
}

fn fail(job_store: &dyn JobStore, job_id: &str, message: String) {
    match job_store.find(job_id) {
        Some(job) => match job.failed(message) {
            Ok(updated) => job_store.save(updated),
            Err(e) => error!("Failed to record failure for job {}: {}", job_id, e),
        },
        None => error!("Job not found on failure: {}", job_id),
    }
}
