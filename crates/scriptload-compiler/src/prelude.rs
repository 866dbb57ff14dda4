//! Ambient declarations compiled into every new compilation service.
//!
//! Only stateful backends keep anything from the prelude compile; the
//! external transpiler runs once per call and its prelude output is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name the prelude is installed under.
pub const PRELUDE_FILE_NAME: &str = "script_globals.ts";

const BUNDLED_SOURCE: &str = include_str!("../prelude/script_globals.ts");

/// The prelude declaration file and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prelude {
    pub path: PathBuf,
    pub source: String,
}

impl Prelude {
    /// The copy compiled into this crate.
    pub fn bundled() -> Self {
        Self {
            path: PathBuf::from(PRELUDE_FILE_NAME),
            source: BUNDLED_SOURCE.to_string(),
        }
    }

    /// Where an installed prelude may live relative to `base`, in order.
    pub fn candidates(base: &Path) -> [PathBuf; 2] {
        [
            base.join(PRELUDE_FILE_NAME),
            base.join("..").join(PRELUDE_FILE_NAME),
        ]
    }

    /// Read the first candidate under `base` that exists.
    ///
    /// Falls back to [`Prelude::bundled`] when neither is present.
    pub fn locate(base: &Path) -> io::Result<Self> {
        match Self::candidates(base).into_iter().find(|path| path.is_file()) {
            Some(path) => {
                let source = fs::read_to_string(&path)?;
                Ok(Self { path, source })
            }
            None => Ok(Self::bundled()),
        }
    }
}

/// Directory installed files are looked up in: next to the running binary.
pub(crate) fn default_prelude_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
