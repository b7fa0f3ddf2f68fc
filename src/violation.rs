//! Violations and the per-run accumulator they collect into.

use crate::transaction::Transaction;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The kind of consistency problem found in one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// The transaction reference occurred earlier in the same file
    DuplicateReference,

    /// The declared end balance differs from start + mutation beyond tolerance
    BalanceMismatch,
}

impl ViolationKind {
    /// Stable identifier used in externally visible reports.
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::DuplicateReference => "DUPLICATE_REFERENCE",
            ViolationKind::BalanceMismatch => "BALANCE_MISMATCH",
        }
    }

    /// Human-readable message derived from the kind.
    pub fn message(&self) -> &'static str {
        match self {
            ViolationKind::DuplicateReference => "Duplicate transaction reference",
            ViolationKind::BalanceMismatch => "End balance does not match calculated balance",
        }
    }
}

/// One detected consistency problem. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Reference of the offending transaction
    pub transaction_reference: String,

    /// Description of the offending transaction
    pub description: String,

    /// What went wrong
    pub kind: ViolationKind,
}

impl Violation {
    /// Flags a duplicate reference.
    pub fn duplicate_reference(tx: &Transaction) -> Self {
        Violation {
            transaction_reference: tx.reference.clone(),
            description: tx.description.clone(),
            kind: ViolationKind::DuplicateReference,
        }
    }

    /// Flags a balance mismatch.
    pub fn balance_mismatch(tx: &Transaction) -> Self {
        Violation {
            transaction_reference: tx.reference.clone(),
            description: tx.description.clone(),
            kind: ViolationKind::BalanceMismatch,
        }
    }
}

/// Append-only collection of violations built during one validation run.
///
/// Owned exclusively by a single run and never shared across runs. Appends
/// are lock-guarded so validators could append from concurrent contexts
/// within the run without losing entries; encounter order is preserved.
#[derive(Debug, Default)]
pub struct ValidationResult {
    violations: Mutex<Vec<Violation>>,
}

impl ValidationResult {
    /// Creates an empty accumulator for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one violation, preserving encounter order.
    pub fn add(&self, violation: Violation) {
        self.violations.lock().push(violation);
    }

    /// A run is valid iff no violations were collected.
    pub fn is_valid(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Total violations collected so far.
    pub fn error_count(&self) -> usize {
        self.violations.lock().len()
    }

    /// Violations of a specific kind collected so far.
    pub fn count_by_kind(&self, kind: ViolationKind) -> usize {
        self.violations.lock().iter().filter(|v| v.kind == kind).count()
    }

    /// Snapshot of the collected violations in encounter order.
    pub fn violations(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }

    /// Consumes the accumulator, yielding the violations in encounter order.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample_tx() -> Transaction {
        Transaction {
            reference: "112806".to_string(),
            account_number: "NL27SNSB0917829871".to_string(),
            description: "Subscription from Jan Dekker".to_string(),
            start_balance: Decimal::from_str("91.23").unwrap(),
            mutation: Decimal::from_str("15.57").unwrap(),
            end_balance: Decimal::from_str("106.8").unwrap(),
        }
    }

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid());
        assert_eq!(result.error_count(), 0);
    }

    #[test]
    fn test_add_makes_result_invalid() {
        let result = ValidationResult::new();
        result.add(Violation::duplicate_reference(&sample_tx()));

        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_counts_by_kind() {
        let result = ValidationResult::new();
        result.add(Violation::duplicate_reference(&sample_tx()));
        result.add(Violation::balance_mismatch(&sample_tx()));
        result.add(Violation::balance_mismatch(&sample_tx()));

        assert_eq!(result.count_by_kind(ViolationKind::DuplicateReference), 1);
        assert_eq!(result.count_by_kind(ViolationKind::BalanceMismatch), 2);
        assert_eq!(result.error_count(), 3);
    }

    #[test]
    fn test_violations_preserve_encounter_order() {
        let result = ValidationResult::new();
        result.add(Violation::balance_mismatch(&sample_tx()));
        result.add(Violation::duplicate_reference(&sample_tx()));

        let violations = result.into_violations();
        assert_eq!(violations[0].kind, ViolationKind::BalanceMismatch);
        assert_eq!(violations[1].kind, ViolationKind::DuplicateReference);
    }

    #[test]
    fn test_kind_messages() {
        assert_eq!(
            ViolationKind::DuplicateReference.message(),
            "Duplicate transaction reference"
        );
        assert_eq!(
            ViolationKind::BalanceMismatch.message(),
            "End balance does not match calculated balance"
        );
    }
}
