//! Error types for the audit edges
//!
//! Resolving a message never fails. Errors only come from parsing raw
//! messages, extending the term table and writing reports.

use thiserror::Error;

/// Errors that can occur outside of unsubscribe resolution
#[derive(Error, Debug)]
pub enum AuditError {
    /// Failed to split a raw message into headers and body
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// A locale term is not a valid pattern
    #[error("Invalid term pattern for locale {locale}: {details}")]
    InvalidPattern { locale: String, details: String },

    /// Failed to write a report
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a report
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
