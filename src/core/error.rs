//! Defines the custom error type for the `core` module.

use thiserror::Error;

/// The primary error type for the `core` module.
///
/// The engine itself degrades gracefully on bad data (invalid paths are skipped,
/// blank globs are dropped), so this enum only covers the boundaries where input
/// arrives from outside: repository URLs, export format names and entry manifests.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input could not be interpreted as a GitHub repository reference.
    #[error("Invalid repository URL: {0}")]
    InvalidRepoUrl(String),

    /// The requested export format is not one of zip, markdown or txt.
    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),

    /// An entry manifest or export payload could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
