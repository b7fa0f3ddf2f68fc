//! Transaction record models for file parsing and validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single transaction record as read from a statement file.
///
/// All fields are required; a record with a missing or unparseable field
/// never makes it past the parsers. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction reference, unique within one file
    pub reference: String,

    /// Account identifier (e.g. an IBAN)
    pub account_number: String,

    /// Free-text description
    pub description: String,

    /// Balance before the mutation
    pub start_balance: Decimal,

    /// Amount added to or subtracted from the start balance
    pub mutation: Decimal,

    /// Declared balance after the mutation
    pub end_balance: Decimal,
}

impl Transaction {
    /// The end balance implied by the start balance and mutation.
    pub fn expected_end_balance(&self) -> Decimal {
        self.start_balance + self.mutation
    }

    /// Checks the declared end balance against the computed one.
    ///
    /// The comparison is inclusive at the boundary: a difference of exactly
    /// `tolerance` passes.
    pub fn is_balance_correct(&self, tolerance: Decimal) -> bool {
        let difference = (self.end_balance - self.expected_end_balance()).abs();
        difference <= tolerance
    }
}

/// Raw record as read from a tabular row, before value-level parsing.
///
/// Uses string-based fields so a malformed value can be skipped per row
/// instead of failing the whole file.
#[derive(Debug)]
pub struct RawRecord {
    /// Transaction reference
    pub reference: Option<String>,

    /// Account identifier
    pub account_number: Option<String>,

    /// Free-text description
    pub description: Option<String>,

    /// Balance before the mutation
    pub start_balance: Option<String>,

    /// Mutation amount
    pub mutation: Option<String>,

    /// Declared balance after the mutation
    pub end_balance: Option<String>,
}

impl RawRecord {
    /// Parses the raw record into a typed transaction.
    ///
    /// Returns `None` if any field is missing or a balance fails to parse
    /// as a decimal; callers log and skip such rows.
    pub fn parse(&self) -> Option<Transaction> {
        let reference = non_empty(self.reference.as_deref())?;

        Some(Transaction {
            reference,
            account_number: self.account_number.as_deref()?.trim().to_string(),
            description: self.description.as_deref()?.trim().to_string(),
            start_balance: parse_decimal(self.start_balance.as_deref())?,
            mutation: parse_decimal(self.mutation.as_deref())?,
            end_balance: parse_decimal(self.end_balance.as_deref())?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(start: &str, mutation: &str, end: &str) -> Transaction {
        Transaction {
            reference: "194261".to_string(),
            account_number: "NL91RABO0315273637".to_string(),
            description: "Clothes from Jan Bakker".to_string(),
            start_balance: Decimal::from_str(start).unwrap(),
            mutation: Decimal::from_str(mutation).unwrap(),
            end_balance: Decimal::from_str(end).unwrap(),
        }
    }

    #[test]
    fn test_expected_end_balance() {
        let tx = tx("21.6", "-41.83", "-20.23");
        assert_eq!(tx.expected_end_balance(), Decimal::from_str("-20.23").unwrap());
    }

    #[test]
    fn test_balance_correct_exact() {
        let tx = tx("100.00", "-50.00", "50.00");
        assert!(tx.is_balance_correct(Decimal::from_str("0.01").unwrap()));
    }

    #[test]
    fn test_balance_correct_at_tolerance_boundary() {
        // A difference of exactly the tolerance passes
        let tx = tx("100.00", "-50.00", "50.01");
        assert!(tx.is_balance_correct(Decimal::from_str("0.01").unwrap()));
    }

    #[test]
    fn test_balance_incorrect_beyond_tolerance() {
        let tx = tx("100.00", "-50.00", "50.02");
        assert!(!tx.is_balance_correct(Decimal::from_str("0.01").unwrap()));
    }

    #[test]
    fn test_raw_record_parses_valid_row() {
        let raw = RawRecord {
            reference: Some("112806".to_string()),
            account_number: Some("NL27SNSB0917829871".to_string()),
            description: Some("Subscription from Jan Dekker".to_string()),
            start_balance: Some("91.23".to_string()),
            mutation: Some("+15.57".to_string()),
            end_balance: Some("106.8".to_string()),
        };

        let tx = raw.parse().unwrap();
        assert_eq!(tx.reference, "112806");
        assert_eq!(tx.mutation, Decimal::from_str("15.57").unwrap());
    }

    #[test]
    fn test_raw_record_trims_whitespace() {
        let raw = RawRecord {
            reference: Some("  112806  ".to_string()),
            account_number: Some(" NL27SNSB0917829871 ".to_string()),
            description: Some(" Subscription ".to_string()),
            start_balance: Some(" 91.23 ".to_string()),
            mutation: Some(" 15.57 ".to_string()),
            end_balance: Some(" 106.8 ".to_string()),
        };

        let tx = raw.parse().unwrap();
        assert_eq!(tx.reference, "112806");
        assert_eq!(tx.account_number, "NL27SNSB0917829871");
    }

    #[test]
    fn test_raw_record_rejects_empty_reference() {
        let raw = RawRecord {
            reference: Some("   ".to_string()),
            account_number: Some("NL27SNSB0917829871".to_string()),
            description: Some("Subscription".to_string()),
            start_balance: Some("91.23".to_string()),
            mutation: Some("15.57".to_string()),
            end_balance: Some("106.8".to_string()),
        };

        assert!(raw.parse().is_none());
    }

    #[test]
    fn test_raw_record_rejects_bad_number() {
        let raw = RawRecord {
            reference: Some("112806".to_string()),
            account_number: Some("NL27SNSB0917829871".to_string()),
            description: Some("Subscription".to_string()),
            start_balance: Some("not-a-number".to_string()),
            mutation: Some("15.57".to_string()),
            end_balance: Some("106.8".to_string()),
        };

        assert!(raw.parse().is_none());
    }

    #[test]
    fn test_raw_record_rejects_missing_field() {
        let raw = RawRecord {
            reference: Some("112806".to_string()),
            account_number: None,
            description: Some("Subscription".to_string()),
            start_balance: Some("91.23".to_string()),
            mutation: Some("15.57".to_string()),
            end_balance: Some("106.8".to_string()),
        };

        assert!(raw.parse().is_none());
    }
}
