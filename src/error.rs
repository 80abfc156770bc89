//! Error types for rust_coexpression

use thiserror::Error;

/// Main error type for co-expression operations
#[derive(Error, Debug)]
pub enum CoexprError {
    #[error("Fetch of {resource} failed: {reason}")]
    FetchFailed { resource: String, reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Gene not found: {gene}")]
    GeneNotFound { gene: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoexprError {
    /// Shorthand for a fetch failure on a named resource
    pub fn fetch_failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        CoexprError::FetchFailed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            CoexprError::FetchFailed { resource, .. } => format!(
                "Could not load {}. Please refresh the page and try again.",
                resource
            ),
            other => format!("An error occurred: {}", other),
        }
    }
}

/// Result type alias for co-expression operations
pub type Result<T> = std::result::Result<T, CoexprError>;
