//! Error types for script-config

use std::path::PathBuf;

/// Result type for script-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in script-config operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Definitions file could not be parsed
    #[error("Invalid script definitions in {path}")]
    InvalidDefinitions {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No definition registered for a script type
    #[error("Unknown script type: {id}")]
    UnknownScriptType { id: String },

    /// Dependency coordinate has the wrong shape
    #[error("Invalid dependency coordinate '{coordinate}': {reason}")]
    InvalidCoordinate { coordinate: String, reason: String },

    /// No resolver could locate a dependency
    #[error("Unable to resolve dependency '{coordinate}': {reason}")]
    UnresolvedDependency { coordinate: String, reason: String },

    /// Directive text could not be parsed
    #[error("Malformed directive '{directive}': {reason}")]
    MalformedDirective { directive: String, reason: String },

    /// Pipeline operation invoked in the wrong state
    #[error("Cannot {operation} while pipeline is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// Tracing subscriber could not be installed
    #[error("Cannot initialize logging: {reason}")]
    LoggingInit { reason: String },

    // Transparent wrappers for underlying crate errors
    /// Error from script-api
    #[error(transparent)]
    Api(#[from] script_api::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
