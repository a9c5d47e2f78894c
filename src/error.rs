//! Error types for the timecard store.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags for callers that correct their input
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    StorageUnavailable,
    DatabaseError,
    LockTimeout,

    // Not Found (exit 3)
    UnknownTable,

    // Validation (exit 4)
    TableAlreadyExists,
    InvalidColumn,
    ColumnCountMismatch,
    CriteriaRequired,
    InvalidOperator,
    InvalidIdentifier,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::LockTimeout => "LOCK_TIMEOUT",
            Self::UnknownTable => "UNKNOWN_TABLE",
            Self::TableAlreadyExists => "TABLE_ALREADY_EXISTS",
            Self::InvalidColumn => "INVALID_COLUMN",
            Self::ColumnCountMismatch => "COLUMN_COUNT_MISMATCH",
            Self::CriteriaRequired => "CRITERIA_REQUIRED",
            Self::InvalidOperator => "INVALID_OPERATOR",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::StorageUnavailable | Self::DatabaseError | Self::LockTimeout => 2,
            Self::UnknownTable => 3,
            Self::TableAlreadyExists
            | Self::InvalidColumn
            | Self::ColumnCountMismatch
            | Self::CriteriaRequired
            | Self::InvalidOperator
            | Self::InvalidIdentifier
            | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True for validation errors and lock timeouts. False for missing
    /// tables, I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidColumn
                | Self::ColumnCountMismatch
                | Self::CriteriaRequired
                | Self::InvalidOperator
                | Self::InvalidIdentifier
                | Self::InvalidArgument
                | Self::LockTimeout
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in store and CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table not found: {table}")]
    UnknownTable {
        table: String,
        /// Cached table names close to the requested one.
        similar: Vec<String>,
    },

    #[error("Table already exists: {table}")]
    TableAlreadyExists { table: String },

    #[error("Column(s) not in table {table}: {}", columns.join(", "))]
    InvalidColumn { table: String, columns: Vec<String> },

    #[error("{expected} columns expected, {actual} values supplied")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("{operation} requires at least one criterion")]
    CriteriaRequired { operation: &'static str },

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Cannot open database at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Timed out after {waited_ms}ms waiting for the store lock")]
    LockTimeout { waited_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownTable { .. } => ErrorCode::UnknownTable,
            Self::TableAlreadyExists { .. } => ErrorCode::TableAlreadyExists,
            Self::InvalidColumn { .. } => ErrorCode::InvalidColumn,
            Self::ColumnCountMismatch { .. } => ErrorCode::ColumnCountMismatch,
            Self::CriteriaRequired { .. } => ErrorCode::CriteriaRequired,
            Self::InvalidOperator(_) => ErrorCode::InvalidOperator,
            Self::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            Self::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::LockTimeout { .. } => ErrorCode::LockTimeout,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UnknownTable { similar, .. } if !similar.is_empty() => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }
            Self::UnknownTable { table, .. } => Some(format!(
                "No table named '{table}'. Use `tc table list` to see available tables."
            )),

            Self::TableAlreadyExists { table } => Some(format!(
                "Drop it first with `tc table drop {table}` or pick another name."
            )),

            Self::InvalidColumn { table, .. } => Some(format!(
                "Use `tc table show {table}` to list its columns."
            )),

            Self::ColumnCountMismatch { .. } => Some(
                "Positional inserts need one value per column, in table order. \
                 Pass --columns to insert a subset."
                    .to_string(),
            ),

            Self::CriteriaRequired { .. } => {
                Some("Add at least one --where \"field op value\" condition.".to_string())
            }

            Self::InvalidOperator(_) => Some(
                "Valid operators: =, !=, <, <=, >, >=, LIKE, NOT LIKE, GLOB, IS, IS NOT. \
                 Synonyms: eq, ne, gt, gte, lt, lte, like"
                    .to_string(),
            ),

            Self::InvalidIdentifier(_) => Some(
                "Identifiers must start with a letter or underscore and contain only \
                 letters, digits and underscores."
                    .to_string(),
            ),

            Self::StorageUnavailable { .. } => Some(
                "Check the --db path (or TIMECARD_DB) and that its directory is writable."
                    .to_string(),
            ),

            Self::LockTimeout { .. } => Some(
                "Another caller is holding the store. Retry, or raise \
                 TIMECARD_LOCK_TIMEOUT_MS."
                    .to_string(),
            ),

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
