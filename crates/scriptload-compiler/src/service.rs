//! Create-if-absent holder for a compilation service.
//!
//! The holder goes from empty to filled exactly once and never back. It is
//! filled only after the backend has created the service *and* the
//! initialisation hook (prelude compilation) has succeeded, so a failed
//! attempt leaves it empty and the next call tries again.

use std::cell::{Cell, OnceCell};
use std::fmt;

use scriptload_types::{BackendError, CompileError, CompileOptions, ConfigurationError, Result};
use tracing::info;

use crate::backend::{CompilationService, CompilerBackend};

/// Holds at most one [`CompilationService`] for the lifetime of its owner.
pub struct ServiceHolder {
    cell: OnceCell<Box<dyn CompilationService>>,
    constructing: Cell<bool>,
}

impl ServiceHolder {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            constructing: Cell::new(false),
        }
    }

    /// The service, if it has been created.
    pub fn get(&self) -> Option<&dyn CompilationService> {
        self.cell.get().map(|service| service.as_ref())
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the held service, creating it first if the holder is empty.
    ///
    /// `options` and `init` are only used when creating. Once the holder is
    /// filled every later call gets the same service regardless of the
    /// options it passes.
    ///
    /// A [`BackendError::NotFound`] from creation or from `init` is reported
    /// as a [`ConfigurationError`] for `extension`. A call made while
    /// creation is already running fails with
    /// [`CompileError::ReentrantConstruction`].
    pub fn get_or_create<F>(
        &self,
        backend: &dyn CompilerBackend,
        options: CompileOptions,
        extension: &str,
        init: F,
    ) -> Result<&dyn CompilationService>
    where
        F: FnOnce(&dyn CompilationService) -> std::result::Result<(), BackendError>,
    {
        if let Some(service) = self.cell.get() {
            return Ok(service.as_ref());
        }
        if self.constructing.replace(true) {
            return Err(CompileError::ReentrantConstruction);
        }
        let _guard = ConstructionGuard(&self.constructing);

        info!(
            package = backend.package(),
            cwd = %options.cwd.display(),
            "creating compilation service"
        );
        let classify = |err: BackendError| match err {
            BackendError::NotFound { .. } => CompileError::from(ConfigurationError {
                extension: extension.to_string(),
                package: backend.package().to_string(),
            }),
            other => CompileError::Backend(other),
        };

        let service = backend.create(&options).map_err(classify)?;
        init(service.as_ref()).map_err(classify)?;

        // Nothing else can have filled the cell: any nested call stopped at
        // the construction flag above.
        let service = self.cell.get_or_init(move || service);
        Ok(service.as_ref())
    }
}

impl Default for ServiceHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHolder")
            .field("options", &self.get().map(|service| service.options()))
            .field("constructing", &self.constructing.get())
            .finish()
    }
}

/// Clears the construction flag on every exit path, including unwinding.
struct ConstructionGuard<'a>(&'a Cell<bool>);

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
