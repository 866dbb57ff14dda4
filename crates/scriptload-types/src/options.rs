use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Module format the transpiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSystem {
    /// `require`/`module.exports`. ES module output is disabled.
    CommonJs,
    EsModules,
}

/// Where source maps go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Appended to the output as a data URL comment.
    Inline,
    None,
}

/// Options a compilation service is created with.
///
/// Fixed for the lifetime of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Directory the transpiler runs in and resolves from.
    pub cwd: PathBuf,
    pub module_system: ModuleSystem,
    pub source_map: SourceMapMode,
}

impl CompileOptions {
    /// CommonJS output with inline source maps, rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            module_system: ModuleSystem::CommonJs,
            source_map: SourceMapMode::Inline,
        }
    }

    /// Options for a service created on behalf of `script_path`.
    ///
    /// The service is rooted at the script's own directory. A bare file name
    /// has no directory, so `working_directory` is used instead.
    pub fn for_script(working_directory: &Path, script_path: &Path) -> Self {
        match script_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Self::new(dir),
            _ => Self::new(working_directory),
        }
    }
}

/// A single compile call. Constructed per call and dropped afterwards.
#[derive(Debug, Clone)]
pub struct CompilationRequest {
    pub script_path: PathBuf,
    pub working_directory: PathBuf,
    pub source_text: String,
}

impl CompilationRequest {
    pub fn new(
        working_directory: impl Into<PathBuf>,
        script_path: impl Into<PathBuf>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            script_path: script_path.into(),
            working_directory: working_directory.into(),
            source_text: source_text.into(),
        }
    }
}
