//! Execution settings.
//!
//! Settings come from three places, later ones overriding earlier ones:
//! built-in defaults, a `name → value` settings map handed to the context,
//! and `QUILL_*` environment variables.

use crate::error::{QuillError, QuillResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Settings key for the CSV reader batch size.
pub const BATCH_SIZE_KEY: &str = "quill.csv.batchSize";
/// Settings key for the number of rows used for CSV schema inference.
pub const CSV_INFER_ROWS_KEY: &str = "quill.csv.inferRows";

const BATCH_SIZE_ENV: &str = "QUILL_BATCH_SIZE";
const CSV_INFER_ROWS_ENV: &str = "QUILL_CSV_INFER_ROWS";

/// Knobs consumed by data sources created through the execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Rows per batch emitted by file-backed data sources.
    pub batch_size: usize,
    /// Rows sampled when inferring a CSV schema.
    pub csv_infer_rows: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            csv_infer_rows: 100,
        }
    }
}

impl ExecutionConfig {
    /// Defaults overridden by the given settings map.
    pub fn from_settings(settings: &HashMap<String, String>) -> QuillResult<Self> {
        let mut config = Self::default();
        if let Some(v) = settings.get(BATCH_SIZE_KEY) {
            config.batch_size = parse_positive(BATCH_SIZE_KEY, v)?;
        }
        if let Some(v) = settings.get(CSV_INFER_ROWS_KEY) {
            config.csv_infer_rows = parse_positive(CSV_INFER_ROWS_KEY, v)?;
        }
        Ok(config)
    }

    /// Defaults overridden by `QUILL_BATCH_SIZE` / `QUILL_CSV_INFER_ROWS`.
    pub fn from_env() -> QuillResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> QuillResult<Self> {
        if let Ok(v) = env::var(BATCH_SIZE_ENV) {
            self.batch_size = parse_positive(BATCH_SIZE_ENV, &v)?;
        }
        if let Ok(v) = env::var(CSV_INFER_ROWS_ENV) {
            self.csv_infer_rows = parse_positive(CSV_INFER_ROWS_ENV, &v)?;
        }
        Ok(self)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

fn parse_positive(key: &str, value: &str) -> QuillResult<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QuillError::Config(format!(
            "{key} must be a positive integer, got '{value}'"
        ))),
    }
}
