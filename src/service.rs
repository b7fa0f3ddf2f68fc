//! The validate-and-deduplicate pipeline.
//!
//! [`ValidationService`] drives one run end to end: it fingerprints the
//! stream while parsing and validating in a single pass, then either
//! short-circuits to a previously stored result for the same content or
//! persists the fresh one. [`ViolationArchive`] handles batched,
//! idempotent violation persistence. [`ReportService`] serves stored
//! reports with an optional page of detail records.

use crate::config::ValidationConfig;
use crate::error::Result;
use crate::fingerprint::FingerprintingReader;
use crate::parser::ParserRegistry;
use crate::report::{PageRequest, ReportAssembler, ValidationReport, ViolationDetail};
use crate::store::{ReportStore, StoredReport, StoredViolation, ViolationStore};
use crate::validator::{default_chain, RunContext, Validator};
use crate::violation::{ValidationResult, Violation};
use chrono::Utc;
use log::{debug, info};
use std::io::Read;
use std::sync::Arc;

/// Coordinates fingerprinting, parsing, the validator chain and
/// idempotent persistence for one validation run.
pub struct ValidationService {
    registry: ParserRegistry,
    validators: Vec<Box<dyn Validator>>,
    report_store: Arc<dyn ReportStore>,
    archive: ViolationArchive,
}

impl ValidationService {
    pub fn new(
        config: &ValidationConfig,
        report_store: Arc<dyn ReportStore>,
        violation_store: Arc<dyn ViolationStore>,
    ) -> Self {
        ValidationService {
            registry: ParserRegistry::default(),
            validators: default_chain(config.balance_tolerance),
            report_store,
            archive: ViolationArchive::new(violation_store, config.violation_batch_size),
        }
    }

    /// Validates a stream and persists the result, deduplicating on the
    /// content fingerprint.
    ///
    /// The fingerprint is only final after the stream is fully consumed,
    /// so the whole file is parsed and validated in one pass first and
    /// the dedup check runs afterwards. On a cache hit the just-computed
    /// result is discarded and the stored one is returned with its full
    /// detail list reconstructed from the violation store; this keeps at
    /// most one persisted result per fingerprint while tolerating
    /// duplicate compute work on a race.
    pub fn validate_and_store(
        &self,
        reader: &mut dyn Read,
        content_type: &str,
        filename: &str,
        file_size: u64,
    ) -> Result<(ValidationReport, String)> {
        let mut tap = FingerprintingReader::new(reader);
        let result = self.validate_stream(&mut tap, content_type)?;
        let fingerprint = tap.fingerprint();
        info!("Computed fingerprint: {}", fingerprint);

        if let Some(existing) = self.report_store.find(&fingerprint) {
            info!(
                "Report with fingerprint {} already exists, returning stored result",
                fingerprint
            );
            let details = self
                .archive
                .all(&fingerprint)
                .iter()
                .map(ViolationDetail::from)
                .collect();
            return Ok((existing.report.with_errors(details), fingerprint));
        }

        let report = ReportAssembler::assemble(&result);

        self.report_store.save(StoredReport {
            fingerprint: fingerprint.clone(),
            report: report.summary_only(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            timestamp: Utc::now(),
            file_size,
        });
        debug!(
            "Saved report {} (summary only, {} errors)",
            fingerprint, report.error_count
        );

        self.archive
            .store_violations(&fingerprint, result.into_violations());
        info!(
            "Stored validation report with fingerprint: {} ({} errors)",
            fingerprint, report.error_count
        );

        Ok((report, fingerprint))
    }

    /// Runs parser and validator chain over the stream, accumulating
    /// violations into a fresh per-run result.
    fn validate_stream(
        &self,
        reader: &mut dyn Read,
        content_type: &str,
    ) -> Result<ValidationResult> {
        info!("Starting validation for content type: {}", content_type);

        let parser = self.registry.select(content_type)?;
        let result = ValidationResult::new();
        let mut ctx = RunContext::new();

        let records = parser.parse(reader)?;
        for record in records {
            let tx = record?;
            for validator in &self.validators {
                validator.check(&tx, &mut ctx, &result);
            }
        }

        info!(
            "Validation completed. Found {} errors",
            result.error_count()
        );
        Ok(result)
    }
}

/// Batched violation persistence with its own idempotency guard,
/// independent of the report-level one.
#[derive(Clone)]
pub struct ViolationArchive {
    store: Arc<dyn ViolationStore>,
    batch_size: usize,
}

impl ViolationArchive {
    pub fn new(store: Arc<dyn ViolationStore>, batch_size: usize) -> Self {
        ViolationArchive { store, batch_size }
    }

    /// Stores the violations of one run in fixed-size batches keyed by
    /// fingerprint plus ordinal index.
    ///
    /// Skips persistence entirely when there is nothing to store or a
    /// batch set already exists for the fingerprint.
    pub fn store_violations(&self, fingerprint: &str, violations: Vec<Violation>) {
        if violations.is_empty() {
            debug!("No violations to store for fingerprint: {}", fingerprint);
            return;
        }

        if self.store.exists(fingerprint) {
            debug!(
                "Violations already exist for fingerprint: {}, skipping storage",
                fingerprint
            );
            return;
        }

        let total = violations.len();
        info!(
            "Storing {} violations for fingerprint: {} in batches of {}",
            total, fingerprint, self.batch_size
        );

        let mut batch = Vec::with_capacity(self.batch_size.min(total));
        for (index, violation) in violations.into_iter().enumerate() {
            batch.push(StoredViolation {
                fingerprint: fingerprint.to_string(),
                index,
                violation,
            });
            if batch.len() == self.batch_size {
                self.store.insert_batch(std::mem::take(&mut batch));
            }
        }
        if !batch.is_empty() {
            self.store.insert_batch(batch);
        }

        info!("Stored {} violations for fingerprint: {}", total, fingerprint);
    }

    /// One page of violations in ordinal order.
    pub fn page(&self, fingerprint: &str, page: usize, size: usize) -> Vec<Violation> {
        self.store.find_page(fingerprint, page, size).items
    }

    /// The full violation list in ordinal order.
    pub fn all(&self, fingerprint: &str) -> Vec<Violation> {
        let total = self.store.count(fingerprint);
        if total == 0 {
            return Vec::new();
        }
        self.store.find_page(fingerprint, 0, total as usize).items
    }
}

/// Serves stored reports, optionally with a page of violation details.
pub struct ReportService {
    report_store: Arc<dyn ReportStore>,
    archive: ViolationArchive,
    config: ValidationConfig,
}

impl ReportService {
    pub fn new(
        config: ValidationConfig,
        report_store: Arc<dyn ReportStore>,
        violation_store: Arc<dyn ViolationStore>,
    ) -> Self {
        let archive = ViolationArchive::new(violation_store, config.violation_batch_size);
        ReportService {
            report_store,
            archive,
            config,
        }
    }

    /// Looks up the report stored for a fingerprint.
    ///
    /// Pagination parameters are validated before any lookup; `None`
    /// values fall back to the configured defaults. Without
    /// `include_errors` the summary is returned as stored.
    pub fn get_report(
        &self,
        fingerprint: &str,
        include_errors: bool,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<Option<ValidationReport>> {
        let request = PageRequest::resolve(page, size, &self.config)?;
        debug!(
            "Retrieving report {} with errors: {}, page: {}, size: {}",
            fingerprint, include_errors, request.page, request.size
        );

        Ok(self.report_store.find(fingerprint).map(|stored| {
            if include_errors {
                let details = self
                    .archive
                    .page(fingerprint, request.page, request.size)
                    .iter()
                    .map(ViolationDetail::from)
                    .collect();
                stored.report.with_errors(details)
            } else {
                stored.report
            }
        }))
    }
}
