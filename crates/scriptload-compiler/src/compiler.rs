//! Script compiler entry point.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use scriptload_types::{
    extension_of, CompilationRequest, CompileError, CompileOptions, Result, ScriptKind,
};
use tracing::{debug, info};

use crate::backend::{CompilationService, CompilerBackend};
use crate::config::CompilerConfig;
use crate::context::ExecutionContext;
use crate::external::ExternalBackend;
use crate::loader::TypedModuleLoader;
use crate::prelude::{default_prelude_dir, Prelude};
use crate::service::ServiceHolder;

// ══════════════════════════════════════════════════════════════════════════════
// ScriptCompiler
// ══════════════════════════════════════════════════════════════════════════════

/// Prepares scripts for a plain-script runtime.
///
/// Construct one per program and pass it by reference. The compilation
/// service is created on the first typed-script compile and reused for
/// every later one: options chosen by that first call (its script's
/// directory) stay in effect, and the working directory passed to later
/// calls is ignored.
pub struct ScriptCompiler {
    backend: Rc<dyn CompilerBackend>,
    prelude_dir: PathBuf,
    service: ServiceHolder,
}

impl ScriptCompiler {
    /// A compiler over `backend`, looking for an installed prelude next to
    /// the running executable.
    pub fn new(backend: Rc<dyn CompilerBackend>) -> Self {
        Self {
            backend,
            prelude_dir: default_prelude_dir(),
            service: ServiceHolder::new(),
        }
    }

    /// A compiler over the configured external transpiler.
    pub fn from_config(config: &CompilerConfig) -> Self {
        let compiler = Self::new(Rc::new(ExternalBackend::new(config.transpiler.clone())));
        match &config.prelude_dir {
            Some(dir) => compiler.with_prelude_dir(dir.clone()),
            None => compiler,
        }
    }

    /// Look for an installed prelude under `dir` instead.
    pub fn with_prelude_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prelude_dir = dir.into();
        self
    }

    pub fn backend(&self) -> &Rc<dyn CompilerBackend> {
        &self.backend
    }

    /// Whether the compilation service has been created.
    pub fn is_initialized(&self) -> bool {
        self.service.is_initialized()
    }

    /// Options the compilation service was created with, once it exists.
    pub fn service_options(&self) -> Option<&CompileOptions> {
        self.service.get().map(|service| service.options())
    }

    /// Return executable source for `script_path`.
    ///
    /// Plain scripts come back unchanged. Typed scripts are transpiled,
    /// creating the compilation service first if needed.
    pub fn compile(
        &self,
        working_directory: &Path,
        script_path: &Path,
        source_text: &str,
    ) -> Result<String> {
        if !ScriptKind::classify(script_path).is_typed() {
            debug!(path = %script_path.display(), "plain script, passing through");
            return Ok(source_text.to_string());
        }

        let service = self.service(working_directory, script_path)?;
        debug!(path = %script_path.display(), "transpiling");
        Ok(service.compile(source_text, script_path)?)
    }

    pub fn compile_request(&self, request: &CompilationRequest) -> Result<String> {
        self.compile(
            &request.working_directory,
            &request.script_path,
            &request.source_text,
        )
    }

    /// Read `script_path` as UTF-8 and [`compile`](Self::compile) it.
    pub fn compile_file(&self, working_directory: &Path, script_path: &Path) -> Result<String> {
        let source = fs::read_to_string(script_path).map_err(|source| CompileError::Read {
            path: script_path.to_path_buf(),
            source,
        })?;
        self.compile(working_directory, script_path, &source)
    }

    /// Give `context` the ability to load typed-script modules.
    ///
    /// Only typed-script entry points get a loader; for anything else the
    /// context is left exactly as it was. A context that already has a
    /// loader is also left alone.
    pub fn prepare_runtime_context(
        &self,
        working_directory: &Path,
        script_path: &Path,
        context: &mut ExecutionContext,
    ) {
        if !ScriptKind::classify(script_path).is_typed() || context.has_loader() {
            return;
        }
        let loader = TypedModuleLoader::new(Rc::clone(&self.backend), working_directory);
        context.install_loader(Rc::new(loader));
        info!(
            cwd = %working_directory.display(),
            "installed typed-script module loader"
        );
    }

    fn service(
        &self,
        working_directory: &Path,
        script_path: &Path,
    ) -> Result<&dyn CompilationService> {
        self.service.get_or_create(
            self.backend.as_ref(),
            CompileOptions::for_script(working_directory, script_path),
            &extension_of(script_path),
            |service| {
                let prelude = Prelude::locate(&self.prelude_dir)?;
                debug!(path = %prelude.path.display(), "compiling prelude");
                service.compile(&prelude.source, &prelude.path)?;
                Ok(())
            },
        )
    }
}

impl fmt::Debug for ScriptCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCompiler")
            .field("package", &self.backend.package())
            .field("prelude_dir", &self.prelude_dir)
            .field("service", &self.service)
            .finish()
    }
}
