//! Array-of-objects (JSON) statement parser.
//!
//! The root must be an array; anything else is a structural failure.
//! Elements that are not well-formed record objects are logged at warn
//! level and skipped. Balance fields are accepted as JSON numbers or
//! strings, and references as strings or numbers.

use crate::error::{Result, ValidationError};
use crate::parser::{RecordIter, TransactionParser};
use crate::transaction::Transaction;
use log::warn;
use rust_decimal::Decimal;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;

/// Parser for `application/json` statement files shaped as an array of
/// record objects.
pub struct JsonParser;

impl TransactionParser for JsonParser {
    fn supports(&self, content_type: &str) -> bool {
        content_type == "application/json" || content_type.to_lowercase().ends_with(".json")
    }

    fn parse<'r>(&self, reader: &'r mut dyn Read) -> Result<RecordIter<'r>> {
        // The whole document is read here, so every byte flows through the
        // wrapping fingerprinter before the iterator is returned.
        let root: Value = serde_json::from_reader(reader).map_err(|e| {
            if e.classify() == serde_json::error::Category::Io {
                ValidationError::Io(e.into())
            } else {
                ValidationError::Parse(format!("Failed to parse JSON file: {}", e))
            }
        })?;

        let elements = match root {
            Value::Array(elements) => elements,
            other => {
                return Err(ValidationError::Parse(format!(
                    "JSON root must be an array, found: {}",
                    value_kind(&other)
                )))
            }
        };

        let records = elements
            .into_iter()
            .enumerate()
            .filter_map(|(idx, element)| match element_to_transaction(&element) {
                Some(tx) => Some(Ok(tx)),
                None => {
                    warn!("Skipping element {}: not a well-formed record", idx);
                    None
                }
            });

        Ok(Box::new(records))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn element_to_transaction(element: &Value) -> Option<Transaction> {
    let object = element.as_object()?;

    let reference = string_field(object.get("reference")?)?;
    if reference.is_empty() {
        return None;
    }

    Some(Transaction {
        reference,
        account_number: string_field(object.get("accountNumber")?)?,
        description: string_field(object.get("description")?)?,
        start_balance: decimal_field(object.get("startBalance")?)?,
        mutation: decimal_field(object.get("mutation")?)?,
        end_balance: decimal_field(object.get("endBalance")?)?,
    })
}

fn string_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decimal_field(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
