//! Persistence contract consumed by the pipeline, plus in-memory
//! implementations.
//!
//! The stores are the only resource mutated concurrently across runs.
//! Idempotent creation is guarded by an existence check immediately
//! before the write; this is best-effort, not a transactional lock, so
//! a narrow race under truly concurrent identical submissions can
//! produce a duplicate write.

use crate::jobs::Job;
use crate::report::ValidationReport;
use crate::violation::Violation;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A persisted validation report, keyed by content fingerprint.
///
/// Created once per unique fingerprint, never mutated afterwards. The
/// embedded report carries summary counts only; detail records live in
/// the violation store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub fingerprint: String,
    pub report: ValidationReport,
    pub filename: String,
    pub content_type: String,
    pub timestamp: DateTime<Utc>,
    pub file_size: u64,
}

/// A persisted violation record, keyed by fingerprint plus ordinal index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredViolation {
    pub fingerprint: String,
    pub index: usize,
    pub violation: Violation,
}

/// One page of a range query.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: u64,
}

/// Key-addressable store for report summaries.
pub trait ReportStore: Send + Sync {
    fn exists(&self, fingerprint: &str) -> bool;
    fn find(&self, fingerprint: &str) -> Option<StoredReport>;
    fn save(&self, report: StoredReport);
}

/// Key-addressable store for violation records with paginated range
/// queries in ordinal order.
pub trait ViolationStore: Send + Sync {
    fn exists(&self, fingerprint: &str) -> bool;
    fn insert_batch(&self, batch: Vec<StoredViolation>);
    fn find_page(&self, fingerprint: &str, page: usize, size: usize) -> Page<Violation>;
    fn count(&self, fingerprint: &str) -> u64;
}

/// Key-addressable store for job records.
pub trait JobStore: Send + Sync {
    fn find(&self, job_id: &str) -> Option<Job>;
    fn save(&self, job: Job);
}

/// In-memory report store.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<String, StoredReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn exists(&self, fingerprint: &str) -> bool {
        self.reports.read().contains_key(fingerprint)
    }

    fn find(&self, fingerprint: &str) -> Option<StoredReport> {
        self.reports.read().get(fingerprint).cloned()
    }

    fn save(&self, report: StoredReport) {
        self.reports
            .write()
            .insert(report.fingerprint.clone(), report);
    }
}

/// In-memory violation store; records are kept in ordinal order per
/// fingerprint.
#[derive(Default)]
pub struct InMemoryViolationStore {
    violations: RwLock<HashMap<String, Vec<StoredViolation>>>,
}

impl InMemoryViolationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViolationStore for InMemoryViolationStore {
    fn exists(&self, fingerprint: &str) -> bool {
        self.violations
            .read()
            .get(fingerprint)
            .is_some_and(|records| !records.is_empty())
    }

    fn insert_batch(&self, batch: Vec<StoredViolation>) {
        let mut violations = self.violations.write();
        let mut touched: HashSet<String> = HashSet::new();
        for record in batch {
            touched.insert(record.fingerprint.clone());
            violations
                .entry(record.fingerprint.clone())
                .or_default()
                .push(record);
        }
        // Only the fingerprints this batch touched need re-ordering
        for fingerprint in touched {
            if let Some(records) = violations.get_mut(&fingerprint) {
                records.sort_by_key(|r| r.index);
            }
        }
    }

    fn find_page(&self, fingerprint: &str, page: usize, size: usize) -> Page<Violation> {
        let violations = self.violations.read();
        let records = violations.get(fingerprint).map(Vec::as_slice).unwrap_or(&[]);

        let start = page.saturating_mul(size).min(records.len());
        let end = start.saturating_add(size).min(records.len());

        Page {
            items: records[start..end]
                .iter()
                .map(|r| r.violation.clone())
                .collect(),
            page,
            size,
            total: records.len() as u64,
        }
    }

    fn count(&self, fingerprint: &str) -> u64 {
        self.violations
            .read()
            .get(fingerprint)
            .map(|records| records.len() as u64)
            .unwrap_or(0)
    }
}

/// In-memory job store.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn find(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }

    fn save(&self, job: Job) {
        self.jobs.write().insert(job.job_id.clone(), job);
    }
}
