//! Shared types for scriptload.
//!
//! This crate defines the script classification, the options a compilation
//! service is created with, the per-call request, and the error taxonomy
//! used across the workspace.

mod error;
mod kind;
mod options;

pub use error::{BackendError, CompileError, ConfigurationError};
pub use kind::{extension_of, ScriptKind, TYPED_SCRIPT_EXTENSIONS};
pub use options::{CompilationRequest, CompileOptions, ModuleSystem, SourceMapMode};

/// Result type used throughout scriptload.
pub type Result<T> = std::result::Result<T, CompileError>;
