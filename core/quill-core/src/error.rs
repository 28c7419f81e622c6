//! Error types for the quill query engine.
//!
//! All public APIs return `QuillResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for every stage of the query pipeline.
#[derive(Debug, Error)]
pub enum QuillError {
    /// Lexer failure (unterminated literal, unknown symbol)
    #[error("tokenize error at offset {position}: {message}")]
    Tokenize { message: String, position: usize },

    /// SQL parsing error
    #[error("SQL parse error: {message}\nSQL: {sql}")]
    SqlParse { message: String, sql: String },

    /// Unsupported SQL feature
    #[error("SQL feature not supported: {feature}\nHint: {hint}")]
    SqlNotSupported { feature: String, hint: String },

    /// Requested table is not registered
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Schema resolution error (missing column, bad projection)
    #[error("schema error: {0}")]
    Schema(String),

    /// Type mismatch between expected and actual values
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Plan, expression or value kind the engine does not handle
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Expression or operator evaluation failure
    #[error("execution error: {message}\nContext: {context}")]
    Execution { message: String, context: String },

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    /// Apache Arrow error (RecordBatch operations, CSV reader)
    #[error("arrow error: {source}")]
    Arrow {
        #[from]
        source: arrow::error::ArrowError,
    },

    /// Apache Parquet error (file I/O)
    #[error("parquet error: {source}")]
    Parquet {
        #[from]
        source: parquet::errors::ParquetError,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for all quill operations.
pub type QuillResult<T> = Result<T, QuillError>;

impl QuillError {
    pub(crate) fn execution(message: impl Into<String>, context: impl Into<String>) -> Self {
        QuillError::Execution {
            message: message.into(),
            context: context.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        QuillError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
