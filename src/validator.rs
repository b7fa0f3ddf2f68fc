//! The validator chain and its per-run context.
//!
//! Validator instances are stateless singletons shared across runs. All
//! mutable state lives in the [`RunContext`] created fresh for every
//! validation run, so two files validated in parallel can never observe
//! each other's state.

use crate::transaction::Transaction;
use crate::violation::{ValidationResult, Violation};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Per-run mutable validation state.
///
/// One instance per top-level validation invocation; threaded into each
/// validator call as an explicit parameter.
#[derive(Debug, Default)]
pub struct RunContext {
    seen_references: HashSet<String>,
}

impl RunContext {
    /// Creates a fresh context for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reference; returns `false` if it was already seen in
    /// this run.
    pub fn record_reference(&mut self, reference: &str) -> bool {
        self.seen_references.insert(reference.to_string())
    }
}

/// One link in the validator chain.
///
/// Side-effects only through the accumulator; never fails for a
/// well-formed record.
pub trait Validator: Send + Sync {
    fn check(&self, tx: &Transaction, ctx: &mut RunContext, result: &ValidationResult);
}

/// Flags records whose declared end balance is off by more than the
/// configured tolerance.
pub struct BalanceValidator {
    tolerance: Decimal,
}

impl BalanceValidator {
    pub fn new(tolerance: Decimal) -> Self {
        BalanceValidator { tolerance }
    }
}

impl Validator for BalanceValidator {
    fn check(&self, tx: &Transaction, _ctx: &mut RunContext, result: &ValidationResult) {
        if !tx.is_balance_correct(self.tolerance) {
            result.add(Violation::balance_mismatch(tx));
        }
    }
}

/// Flags every occurrence of a reference after the first within one run.
///
/// Holds no state of its own; the seen-set lives in the run context.
pub struct UniquenessValidator;

impl Validator for UniquenessValidator {
    fn check(&self, tx: &Transaction, ctx: &mut RunContext, result: &ValidationResult) {
        if !ctx.record_reference(&tx.reference) {
            result.add(Violation::duplicate_reference(tx));
        }
    }
}

/// The default chain, in the order validators run per record.
pub fn default_chain(tolerance: Decimal) -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(UniquenessValidator),
        Box::new(BalanceValidator::new(tolerance)),
    ]
}
