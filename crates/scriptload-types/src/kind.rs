use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File extensions (without the dot) that need a transpile step.
pub const TYPED_SCRIPT_EXTENSIONS: [&str; 3] = ["ts", "tsx", "cts"];

/// How a script must be prepared before a plain runtime can execute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    /// Statically-typed superset syntax; must be transpiled.
    TypedScript,
    /// Anything else. Executed as-is.
    PlainScript,
}

impl ScriptKind {
    /// Classify a path by its last extension.
    ///
    /// Matching is case-sensitive: `Main.TS` is a plain script. Declaration
    /// files such as `globals.d.ts` end in `.ts` and are typed scripts.
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if TYPED_SCRIPT_EXTENSIONS.contains(&ext) => Self::TypedScript,
            _ => Self::PlainScript,
        }
    }

    pub fn is_typed(self) -> bool {
        self == Self::TypedScript
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypedScript => write!(f, "typed-script"),
            Self::PlainScript => write!(f, "plain-script"),
        }
    }
}

/// The extension of `path` including its leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
