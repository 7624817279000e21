//! Error types for report computation and rendering.

use thiserror::Error;

use whodu_core::WalkError;

/// Errors surfaced while computing or rendering a usage report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The walk of the target path failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The user-name filter is not a valid regular expression.
    #[error("invalid user filter pattern '{pattern}'")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Writing the rendered report failed.
    #[error("failed to write report")]
    Write(#[from] std::io::Error),
}
