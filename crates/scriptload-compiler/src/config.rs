//! Compiler configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "working_directory": "/home/dev/project",
//!   "transpiler": "esbuild",
//!   "prelude_dir": "/usr/lib/scriptload"
//! }
//! ```
//!
//! Every field is optional. `SCRIPTLOAD_TRANSPILER` overrides `transpiler`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external::DEFAULT_TRANSPILER;

/// Environment variable that overrides [`CompilerConfig::transpiler`].
pub const TRANSPILER_ENV: &str = "SCRIPTLOAD_TRANSPILER";

/// Errors loading a config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Root for runtime module loaders and for bare script names.
    pub working_directory: PathBuf,
    /// Transpiler executable name or path.
    pub transpiler: String,
    /// Directory searched for an installed prelude. Defaults to the
    /// directory of the running executable.
    pub prelude_dir: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            working_directory: PathBuf::from("."),
            transpiler: DEFAULT_TRANSPILER.to_string(),
            prelude_dir: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Apply [`TRANSPILER_ENV`] if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_transpiler_override(std::env::var(TRANSPILER_ENV).ok())
    }

    fn with_transpiler_override(mut self, transpiler: Option<String>) -> Self {
        if let Some(transpiler) = transpiler.filter(|t| !t.trim().is_empty()) {
            self.transpiler = transpiler;
        }
        self
    }
}
