//! Externally visible report shape, assembly and pagination.

use crate::config::ValidationConfig;
use crate::error::{Result, ValidationError};
use crate::violation::{ValidationResult, Violation, ViolationKind};
use serde::{Deserialize, Serialize};

/// One violation entry as rendered in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationDetail {
    pub transaction_reference: String,
    pub description: String,
    pub error_type: String,
    pub error_message: String,
}

impl From<&Violation> for ViolationDetail {
    fn from(violation: &Violation) -> Self {
        ViolationDetail {
            transaction_reference: violation.transaction_reference.clone(),
            description: violation.description.clone(),
            error_type: violation.kind.name().to_string(),
            error_message: violation.kind.message().to_string(),
        }
    }
}

/// The validation report for one file.
///
/// The summary fields are always authoritative; `errors` carries an
/// optional page of detail entries and may be empty even when the file
/// is invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub error_count: usize,
    pub duplicate_reference_count: usize,
    pub balance_mismatch_count: usize,
    pub errors: Vec<ViolationDetail>,
}

impl ValidationReport {
    /// Copy of this report with the detail list stripped, keeping only
    /// the summary counts.
    pub fn summary_only(&self) -> ValidationReport {
        ValidationReport {
            errors: Vec::new(),
            ..self.clone()
        }
    }

    /// Copy of this report carrying the given page of detail entries.
    pub fn with_errors(&self, errors: Vec<ViolationDetail>) -> ValidationReport {
        ValidationReport {
            errors,
            ..self.clone()
        }
    }
}

/// Maps an accumulated result to the report shape.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Builds the full report: one detail entry per violation in
    /// encounter order, counts derived by kind.
    pub fn assemble(result: &ValidationResult) -> ValidationReport {
        let violations = result.violations();
        let errors = violations.iter().map(ViolationDetail::from).collect();

        ValidationReport {
            valid: result.is_valid(),
            error_count: result.error_count(),
            duplicate_reference_count: result.count_by_kind(ViolationKind::DuplicateReference),
            balance_mismatch_count: result.count_by_kind(ViolationKind::BalanceMismatch),
            errors,
        }
    }
}

/// Validated pagination parameters for violation detail retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Resolves caller-supplied parameters against the configured
    /// defaults and bounds, rejecting out-of-range values before any
    /// lookup happens.
    pub fn resolve(
        page: Option<i64>,
        size: Option<i64>,
        config: &ValidationConfig,
    ) -> Result<PageRequest> {
        let page = page.unwrap_or(0);
        if page < 0 {
            return Err(ValidationError::InvalidPagination(format!(
                "page must be >= 0, got {}",
                page
            )));
        }

        let size = size.unwrap_or(config.default_page_size as i64);
        if size < 1 {
            return Err(ValidationError::InvalidPagination(format!(
                "page size must be >= 1, got {}",
                size
            )));
        }
        if size > config.max_page_size as i64 {
            return Err(ValidationError::InvalidPagination(format!(
                "page size must be <= {}, got {}",
                config.max_page_size, size
            )));
        }

        Ok(PageRequest {
            page: page as usize,
            size: size as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample_tx(reference: &str) -> Transaction {
        Transaction {
            reference: reference.to_string(),
            account_number: "NL93ABNA0585619023".to_string(),
            description: "Flowers for Richard Bakker".to_string(),
            start_balance: Decimal::from_str("100.00").unwrap(),
            mutation: Decimal::from_str("-50.00").unwrap(),
            end_balance: Decimal::from_str("50.00").unwrap(),
        }
    }

    #[test]
    fn test_assemble_valid_report() {
        let result = ValidationResult::new();
        let report = ReportAssembler::assemble(&result);

        assert!(report.valid);
        assert_eq!(report.error_count, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_assemble_maps_violations_in_order() {
        let result = ValidationResult::new();
        result.add(Violation::balance_mismatch(&sample_tx("112806")));
        result.add(Violation::duplicate_reference(&sample_tx("112806")));

        let report = ReportAssembler::assemble(&result);
        assert!(!report.valid);
        assert_eq!(report.error_count, 2);
        assert_eq!(report.duplicate_reference_count, 1);
        assert_eq!(report.balance_mismatch_count, 1);
        assert_eq!(report.errors[0].error_type, "BALANCE_MISMATCH");
        assert_eq!(report.errors[1].error_type, "DUPLICATE_REFERENCE");
        assert_eq!(
            report.errors[1].error_message,
            "Duplicate transaction reference"
        );
    }

    #[test]
    fn test_summary_only_strips_details_but_keeps_counts() {
        let result = ValidationResult::new();
        result.add(Violation::balance_mismatch(&sample_tx("112806")));

        let summary = ReportAssembler::assemble(&result).summary_only();
        assert_eq!(summary.error_count, 1);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let result = ValidationResult::new();
        let report = ReportAssembler::assemble(&result);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["errorCount"], 0);
        assert!(json.get("duplicateReferenceCount").is_some());
        assert!(json.get("balanceMismatchCount").is_some());
    }

    #[test]
    fn test_page_request_defaults() {
        let config = ValidationConfig::default();
        let request = PageRequest::resolve(None, None, &config).unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, config.default_page_size);
    }

    #[test]
    fn test_page_request_rejects_negative_page() {
        let config = ValidationConfig::default();
        let err = PageRequest::resolve(Some(-1), None, &config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPagination(_)));
    }

    #[test]
    fn test_page_request_rejects_zero_size() {
        let config = ValidationConfig::default();
        let err = PageRequest::resolve(None, Some(0), &config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPagination(_)));
    }

    #[test]
    fn test_page_request_rejects_oversized_page() {
        let config = ValidationConfig::default();
        let err =
            PageRequest::resolve(None, Some(config.max_page_size as i64 + 1), &config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPagination(_)));
    }

    #[test]
    fn test_page_request_accepts_bounds() {
        let config = ValidationConfig::default();
        let request =
            PageRequest::resolve(Some(3), Some(config.max_page_size as i64), &config).unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.size, config.max_page_size);
    }
}
