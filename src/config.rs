//! Runtime configuration for the validation pipeline.

use crate::error::{Result, ValidationError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Tunables for validation, violation storage and report pagination.
///
/// Deserializable from a JSON file; every field falls back to the
/// documented default when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Maximum acceptable absolute difference between declared and
    /// computed end balance
    pub balance_tolerance: Decimal,

    /// Number of violation records written per batch
    pub violation_batch_size: usize,

    /// Page size used when the caller does not specify one
    pub default_page_size: usize,

    /// Upper bound on caller-specified page sizes
    pub max_page_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            balance_tolerance: Decimal::new(1, 2), // 0.01
            violation_batch_size: 1000,
            default_page_size: 1000,
            max_page_size: 10000,
        }
    }
}

impl ValidationConfig {
    /// Loads configuration from a JSON file, falling back to defaults for
    /// missing fields.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ValidationError::Unexpected(format!("invalid config file: {}", e)))
    }
}
