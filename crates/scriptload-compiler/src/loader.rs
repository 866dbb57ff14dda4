//! Module loader installed into runtime contexts for typed-script entry
//! points.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use scriptload_types::{extension_of, CompileError, CompileOptions, Result, ScriptKind};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::backend::CompilerBackend;
use crate::context::ModuleLoader;
use crate::service::ServiceHolder;

/// Compiled module output keyed by the source it was compiled from.
#[derive(Debug, Clone)]
struct CachedModule {
    digest: Vec<u8>,
    output: String,
}

/// Loads plain modules as-is and transpiles typed modules on demand.
///
/// The loader owns its own compilation service, created on the first typed
/// load and rooted at the working directory the loader was built with. It
/// does not compile the prelude. Outputs are memoized per path and source
/// digest, so a module whose source is unchanged is transpiled once.
pub struct TypedModuleLoader {
    backend: Rc<dyn CompilerBackend>,
    options: CompileOptions,
    service: ServiceHolder,
    cache: RefCell<HashMap<PathBuf, CachedModule>>,
}

impl TypedModuleLoader {
    pub fn new(backend: Rc<dyn CompilerBackend>, working_directory: &Path) -> Self {
        Self {
            backend,
            options: CompileOptions::new(working_directory),
            service: ServiceHolder::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Whether the loader's compilation service has been created.
    pub fn is_initialized(&self) -> bool {
        self.service.is_initialized()
    }

    /// Number of distinct modules with a memoized compile.
    pub fn cached_modules(&self) -> usize {
        self.cache.borrow().len()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.options.cwd.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl ModuleLoader for TypedModuleLoader {
    fn load(&self, path: &Path) -> Result<String> {
        let path = self.resolve(path);
        let source = fs::read_to_string(&path).map_err(|source| CompileError::Read {
            path: path.clone(),
            source,
        })?;

        if !ScriptKind::classify(&path).is_typed() {
            return Ok(source);
        }

        let digest = Sha256::digest(source.as_bytes()).to_vec();
        if let Some(hit) = self.cache.borrow().get(&path) {
            if hit.digest == digest {
                debug!(path = %path.display(), "module cache hit");
                return Ok(hit.output.clone());
            }
        }

        let service = self.service.get_or_create(
            self.backend.as_ref(),
            self.options.clone(),
            &extension_of(&path),
            |_| Ok(()),
        )?;
        let output = service.compile(&source, &path)?;

        self.cache.borrow_mut().insert(
            path,
            CachedModule {
                digest,
                output: output.clone(),
            },
        );
        Ok(output)
    }
}

impl fmt::Debug for TypedModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedModuleLoader")
            .field("package", &self.backend.package())
            .field("options", &self.options)
            .field("service", &self.service)
            .field("cached_modules", &self.cached_modules())
            .finish()
    }
}
