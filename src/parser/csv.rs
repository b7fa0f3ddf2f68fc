//! Tabular (CSV) statement parser.
//!
//! The header is checked eagerly: fewer columns than the expected six is a
//! structural failure. Individual rows with a wrong column count or an
//! unparseable value are logged at warn level and skipped.

use crate::error::{Result, ValidationError};
use crate::parser::{RecordIter, TransactionParser};
use crate::transaction::{RawRecord, Transaction};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::warn;
use std::io::Read;

const EXPECTED_COLUMNS: usize = 6;

/// Parser for `text/csv` / `application/csv` statement files with the
/// header `Reference,AccountNumber,Description,Start Balance,Mutation,End Balance`.
pub struct CsvParser;

impl TransactionParser for CsvParser {
    fn supports(&self, content_type: &str) -> bool {
        content_type == "text/csv"
            || content_type == "application/csv"
            || content_type.to_lowercase().ends_with(".csv")
    }

    fn parse<'r>(&self, reader: &'r mut dyn Read) -> Result<RecordIter<'r>> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = match csv_reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => return Err(structural(e)),
        };

        // Empty input is structurally valid and yields no records
        if is_empty_row(&headers) {
            return Ok(Box::new(std::iter::empty()));
        }

        if headers.len() < EXPECTED_COLUMNS {
            return Err(ValidationError::Parse(format!(
                "Invalid CSV format. Expected at least {} columns, found {}",
                EXPECTED_COLUMNS,
                headers.len()
            )));
        }

        let records = csv_reader
            .into_records()
            .enumerate()
            .filter_map(|(row_idx, row)| {
                let row_num = row_idx + 2; // 1-indexed, accounting for header row
                match row {
                    Ok(record) => parse_row(&record, row_num).map(Ok),
                    Err(e) => match e.into_kind() {
                        csv::ErrorKind::Io(io_err) => Some(Err(ValidationError::Io(io_err))),
                        other => {
                            warn!("Skipping row {}: CSV parse error: {:?}", row_num, other);
                            None
                        }
                    },
                }
            });

        Ok(Box::new(records))
    }
}

fn structural(e: csv::Error) -> ValidationError {
    match e.into_kind() {
        csv::ErrorKind::Io(io_err) => ValidationError::Io(io_err),
        other => ValidationError::Parse(format!("Failed to parse CSV file: {:?}", other)),
    }
}

fn is_empty_row(record: &StringRecord) -> bool {
    record.len() == 0 || (record.len() == 1 && record[0].trim().is_empty())
}

fn parse_row(record: &StringRecord, row_num: usize) -> Option<Transaction> {
    if is_empty_row(record) {
        return None;
    }

    if record.len() < EXPECTED_COLUMNS {
        warn!(
            "Skipping row {}: insufficient columns (expected {}, found {})",
            row_num,
            EXPECTED_COLUMNS,
            record.len()
        );
        return None;
    }

    let raw = RawRecord {
        reference: record.get(0).map(str::to_string),
        account_number: record.get(1).map(str::to_string),
        description: record.get(2).map(str::to_string),
        start_balance: record.get(3).map(str::to_string),
        mutation: record.get(4).map(str::to_string),
        end_balance: record.get(5).map(str::to_string),
    };

    match raw.parse() {
        Some(tx) => Some(tx),
        None => {
            warn!("Skipping row {}: invalid value format", row_num);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::str::FromStr;

    fn parse_all(input: &str) -> Result<Vec<Transaction>> {
        let mut cursor = Cursor::new(input.as_bytes().to_vec());
        let records = CsvParser.parse(&mut cursor)?;
        records.collect()
    }

    #[test]
    fn test_parses_valid_file() {
        let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n\
                   194261,NL91RABO0315273637,Clothes from Jan Bakker,21.6,-41.83,-20.23\n\
                   112806,NL27SNSB0917829871,Subscription from Jan Dekker,91.23,+15.57,106.8\n";

        let transactions = parse_all(csv).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].reference, "194261");
        assert_eq!(
            transactions[1].mutation,
            Decimal::from_str("15.57").unwrap()
        );
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        let transactions = parse_all("").unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn test_header_only_yields_empty_sequence() {
        let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n";
        let transactions = parse_all(csv).unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn test_too_few_header_columns_is_structural_failure() {
        let err = parse_all("Reference,AccountNumber\n1,2\n").unwrap_err();
        assert!(matches!(err, ValidationError::Parse(_)));
    }

    #[test]
    fn test_row_with_bad_number_is_skipped() {
        let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n\
                   194261,NL91RABO0315273637,Clothes,not-a-number,-41.83,-20.23\n\
                   112806,NL27SNSB0917829871,Subscription,91.23,15.57,106.8\n";

        let transactions = parse_all(csv).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].reference, "112806");
    }

    #[test]
    fn test_row_with_missing_columns_is_skipped() {
        let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n\
                   194261,NL91RABO0315273637,Clothes\n\
                   112806,NL27SNSB0917829871,Subscription,91.23,15.57,106.8\n";

        let transactions = parse_all(csv).unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let csv = "Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n\
                   194261 , NL91RABO0315273637 , Clothes , 21.6 , -41.83 , -20.23\n";

        let transactions = parse_all(csv).unwrap();
        assert_eq!(transactions[0].reference, "194261");
        assert_eq!(transactions[0].account_number, "NL91RABO0315273637");
    }

    #[test]
    fn test_supports_content_types() {
        assert!(CsvParser.supports("text/csv"));
        assert!(CsvParser.supports("application/csv"));
        assert!(CsvParser.supports("records.csv"));
        assert!(CsvParser.supports("RECORDS.CSV"));
        assert!(!CsvParser.supports("application/json"));
    }
}
