//! scriptload compiler: turns script files into source a plain runtime can
//! execute.
//!
//! ```text
//! script path ─ classify ─┬─ plain-script ──────────────────────────────▶ source
//!                         └─ typed-script ─ service (created once) ─ transpile ─▶ source
//! ```
//!
//! The transpiler itself is external. [`ExternalBackend`] drives a
//! user-installed executable; anything implementing [`CompilerBackend`] can
//! stand in for it.

pub mod backend;
pub mod compiler;
pub mod config;
pub mod context;
pub mod external;
pub mod loader;
pub mod prelude;
pub mod service;

pub use backend::{CompilationService, CompilerBackend};
pub use compiler::ScriptCompiler;
pub use config::{CompilerConfig, ConfigFileError, TRANSPILER_ENV};
pub use context::{ContextSnapshot, ExecutionContext, ModuleLoader};
pub use external::{ExternalBackend, DEFAULT_TRANSPILER};
pub use loader::TypedModuleLoader;
pub use prelude::{Prelude, PRELUDE_FILE_NAME};
pub use service::ServiceHolder;

pub use scriptload_types::{
    BackendError, CompilationRequest, CompileError, CompileOptions, ConfigurationError,
    ModuleSystem, Result, ScriptKind, SourceMapMode,
};
