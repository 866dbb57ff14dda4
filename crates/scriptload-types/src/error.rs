//! Error taxonomy.
//!
//! Exactly one classification happens: a backend that cannot be found while
//! creating a service becomes a [`ConfigurationError`]. Every other failure
//! reaches the caller unchanged as [`CompileError::Backend`].

use std::path::PathBuf;
use thiserror::Error;

/// The transpiler dependency (or one of its peers) is not installed.
///
/// Not retryable until the user installs the missing package.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Attempted to execute script with extension {extension}, but the '{package}' module, \
     or one of its required peers, has not been installed."
)]
pub struct ConfigurationError {
    /// Extension of the script that triggered service creation, e.g. `.ts`.
    pub extension: String,
    /// Name of the missing dependency.
    pub package: String,
}

/// Failures reported by a compiler backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend's executable or package could not be resolved.
    #[error("cannot find module '{package}' (searched from {searched_from})")]
    NotFound { package: String, searched_from: PathBuf },

    /// The backend was found but could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend rejected the input, e.g. a syntax error in the script.
    #[error("{file}: {message}")]
    Diagnostic { file: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors returned by compile operations.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Any unclassified backend failure, passed through as-is.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Service construction was re-entered while already in progress.
    #[error("compilation service requested while it is still being constructed")]
    ReentrantConstruction,
}
