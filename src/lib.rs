//! # Statement Validator
//!
//! A validate-and-deduplicate pipeline for bulk transaction statement
//! files (CSV or JSON array-of-records).
//!
//! ## Design Principles
//!
//! - **Single-pass streaming**: the content fingerprint is computed while
//!   the file is parsed and validated, never in a separate pass
//! - **Content-addressed dedup**: byte-identical re-submissions return
//!   the previously stored report instead of re-validating
//! - **Per-run isolation**: validator instances are stateless singletons;
//!   all mutable validation state lives in a context created per run
//! - **Fixed-point arithmetic**: balances use `rust_decimal`
//!
//! ## Example
//!
//! ```no_run
//! use statement_validator::{
//!     InMemoryReportStore, InMemoryViolationStore, ValidationConfig, ValidationService,
//! };
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let config = ValidationConfig::default();
//! let service = ValidationService::new(
//!     &config,
//!     Arc::new(InMemoryReportStore::new()),
//!     Arc::new(InMemoryViolationStore::new()),
//! );
//!
//! let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n";
//! let mut input = Cursor::new(csv.as_bytes().to_vec());
//! let (report, fingerprint) = service
//!     .validate_and_store(&mut input, "text/csv", "records.csv", csv.len() as u64)
//!     .unwrap();
//! assert!(report.valid);
//! assert_eq!(fingerprint.len(), 32);
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod jobs;
pub mod parser;
pub mod report;
pub mod service;
pub mod store;
pub mod transaction;
pub mod validator;
pub mod violation;

pub use config::ValidationConfig;
pub use error::{Result, ValidationError};
pub use fingerprint::{fingerprint_bytes, FingerprintingReader};
pub use jobs::{Job, JobService, JobStatus};
pub use parser::{CsvParser, JsonParser, ParserRegistry, TransactionParser};
pub use report::{PageRequest, ReportAssembler, ValidationReport, ViolationDetail};
pub use service::{ReportService, ValidationService, ViolationArchive};
pub use store::{
    InMemoryJobStore, InMemoryReportStore, InMemoryViolationStore, JobStore, Page, ReportStore,
    StoredReport, StoredViolation, ViolationStore,
};
pub use transaction::{RawRecord, Transaction};
pub use validator::{BalanceValidator, RunContext, UniquenessValidator, Validator};
pub use violation::{ValidationResult, Violation, ViolationKind};
