//! Pluggable record parsers and the content-type based selector.

mod csv;
mod json;

pub use self::csv::CsvParser;
pub use self::json::JsonParser;

use crate::error::{Result, ValidationError};
use crate::transaction::Transaction;
use std::io::Read;

/// Lazy, finite, non-restartable sequence of transaction records.
///
/// Value-level problems in individual rows are logged and skipped by the
/// parser; an `Err` item means the underlying stream failed mid-iteration.
pub type RecordIter<'r> = Box<dyn Iterator<Item = Result<Transaction>> + 'r>;

/// Converts a raw byte stream into a sequence of transaction records.
pub trait TransactionParser: Send + Sync {
    /// Whether this parser handles the declared content type.
    fn supports(&self, content_type: &str) -> bool;

    /// Validates the format's structural shape and returns the record
    /// sequence.
    ///
    /// Fails fast with [`ValidationError::Parse`] if the header or root
    /// shape is absent or malformed. An empty but structurally valid input
    /// yields an empty sequence.
    fn parse<'r>(&self, reader: &'r mut dyn Read) -> Result<RecordIter<'r>>;
}

/// Registry of parsers, matched first-to-last against a content type.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn TransactionParser>>,
}

impl ParserRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ParserRegistry { parsers: Vec::new() }
    }

    /// Appends a parser; selection order equals registration order.
    pub fn register(&mut self, parser: Box<dyn TransactionParser>) {
        self.parsers.push(parser);
    }

    /// Picks the first registered parser that supports the content type.
    pub fn select(&self, content_type: &str) -> Result<&dyn TransactionParser> {
        self.parsers
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.supports(content_type))
            .ok_or_else(|| ValidationError::UnsupportedContentType(content_type.to_string()))
    }
}

impl Default for ParserRegistry {
    /// Registry with the built-in parsers: CSV first, then JSON.
    fn default() -> Self {
        let mut registry = ParserRegistry::new();
        registry.register(Box::new(CsvParser));
        registry.register(Box::new(JsonParser));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_csv_by_content_type() {
        let registry = ParserRegistry::default();
        assert!(registry.select("text/csv").is_ok());
        assert!(registry.select("application/csv").is_ok());
    }

    #[test]
    fn test_select_json_by_content_type() {
        let registry = ParserRegistry::default();
        assert!(registry.select("application/json").is_ok());
    }

    #[test]
    fn test_select_by_filename_extension() {
        let registry = ParserRegistry::default();
        assert!(registry.select("records.csv").is_ok());
        assert!(registry.select("records.JSON").is_ok());
    }

    #[test]
    fn test_select_unknown_content_type_fails() {
        let registry = ParserRegistry::default();
        let err = registry.select("application/xml").map(|_| ()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedContentType(_)));
    }
}
