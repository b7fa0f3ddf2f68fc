//! Error types for the statement validator.

use thiserror::Error;

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors that can occur while validating a statement file.
///
/// Row-level problems (a malformed value in an otherwise well-formed file)
/// never surface here; they are logged and the row is skipped. Only
/// structural and system failures propagate to the caller.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Failed to read the input stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file failed the format's structural check (bad header, wrong root type)
    #[error("Failed to parse file: {0}")]
    Parse(String),

    /// No registered parser supports the declared content type
    #[error("No parser found for content type: {0}")]
    UnsupportedContentType(String),

    /// Pagination parameters out of bounds
    #[error("Invalid pagination parameters: {0}")]
    InvalidPagination(String),

    /// Anything else; surfaces as a generic failure
    #[error("Validation failed: {0}")]
    Unexpected(String),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: statement-validator <input-file> [content-type]")]
    MissingArgument,
}
