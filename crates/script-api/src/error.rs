//! Error types for script-api

/// Result type for script-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in script-api operations
///
/// These are faults of the host or the calling code. Problems found in a
/// script itself are reported as [`crate::Diagnostic`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A failed result was requested without any error-level diagnostic
    #[error("Failure result requires at least one error-level diagnostic")]
    FailureWithoutError,

    /// Script source could not be read
    #[error("Failed to read script source {location}")]
    SourceRead {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// Script source path exists but does not point at a file
    #[error("Script source {location} is not a regular file")]
    SourceNotAFile { location: String },
}
