//! The seam between scriptload and whatever performs the transpile.

use std::path::Path;

use scriptload_types::{BackendError, CompileOptions};

/// Factory for compilation services.
pub trait CompilerBackend {
    /// Name of the dependency this backend needs, used in error messages.
    fn package(&self) -> &str;

    /// Create a service bound to `options`.
    ///
    /// Must return [`BackendError::NotFound`] when the dependency is not
    /// installed, so the caller can report it as a configuration problem.
    fn create(&self, options: &CompileOptions) -> Result<Box<dyn CompilationService>, BackendError>;
}

/// A live transpiler instance.
pub trait CompilationService {
    /// Options the service was created with.
    fn options(&self) -> &CompileOptions;

    /// Transform `source`. `file` is used for diagnostics and source maps.
    fn compile(&self, source: &str, file: &Path) -> Result<String, BackendError>;
}
