//! Custom error types for paperfetcher-web.
//!
//! Every failure the shell can surface to the user maps to a variant here.
//! All of them are recoverable at the UI boundary: the shell stays usable
//! for the next submission.

use thiserror::Error;

use crate::backend::FetchError;

/// Main error type for shell operations.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Query rejected before any backend call (empty keywords, bad ISSN/DOI)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The external fetch backend failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The query was valid but returned zero records
    #[error("The search returned no results. Try broadening your keywords or date range.")]
    EmptyResult,

    /// Dry run reported more results than the configured limit allows
    #[error("This search would return {expected} results, which exceeds the limit of {limit}")]
    LimitExceeded {
        /// Expected result count reported by the backend
        expected: usize,
        /// Configured result limit
        limit: usize,
    },

    /// File I/O error (export file, journal list)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error during export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ShellError`
pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    /// User-facing message for this error, suitable for the web banner
    /// and the CLI. Never exposes more than the `Display` text.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
