//! Domain-level error types for chat-log-excelizer.
//!
//! All errors are typed with `thiserror`. Store and delivery failures
//! propagate to the host; export failures stay inside [`ExportError`].

use thiserror::Error;

/// Application-level errors surfaced to the host.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failed to open, query or modify the record store.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input such as an unrepresentable timestamp or unknown command.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Handing an exported file back to the session failed.
    #[error("Delivery error: {message}")]
    Delivery { message: String },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Failure while building or writing an export spreadsheet.
///
/// Never escapes the command surface: it is logged and the command
/// produces no reply.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The spreadsheet writer rejected the document or the file write failed.
    #[error("{0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// More records than a worksheet can address.
    #[error("Too many records for one worksheet: {0}")]
    TooManyRows(usize),

    /// The blocking export task panicked or was cancelled.
    #[error("Export task failed: {0}")]
    Task(String),
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
