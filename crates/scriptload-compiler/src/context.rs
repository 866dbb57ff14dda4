//! Execution context handed to the script runner.
//!
//! Instead of evaluating a registration snippet inside the runner's global
//! scope, module loading is an explicit capability: a [`ModuleLoader`] is
//! installed into the context and downstream code calls
//! [`ModuleLoader::load`] for every module it needs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use scriptload_types::Result;
use serde_json::Value;

/// Loads a module's executable source by path.
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<String>;
}

/// Globals and capabilities visible to executed code.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    globals: BTreeMap<String, Value>,
    loader: Option<Rc<dyn ModuleLoader>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a global.
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Global names in sorted order.
    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.globals.keys().map(String::as_str)
    }

    /// The installed module loader, if any.
    pub fn loader(&self) -> Option<&Rc<dyn ModuleLoader>> {
        self.loader.as_ref()
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Install `loader` unless one is already present.
    ///
    /// Returns `false`, leaving the context untouched, if a loader was
    /// already installed.
    pub fn install_loader(&mut self, loader: Rc<dyn ModuleLoader>) -> bool {
        if self.loader.is_some() {
            return false;
        }
        self.loader = Some(loader);
        true
    }

    /// Everything observable about the context, for before/after comparison.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            globals: self.globals.clone(),
            has_loader: self.has_loader(),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("globals", &self.globals)
            .field("has_loader", &self.has_loader())
            .finish()
    }
}

/// A comparable copy of an [`ExecutionContext`]'s observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub globals: BTreeMap<String, Value>,
    pub has_loader: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str);

    impl ModuleLoader for Fixed {
        fn load(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_globals() {
        let mut ctx = ExecutionContext::new();
        ctx.set_global("network", json!("development"));
        ctx.set_global("accounts", json!(["0x01", "0x02"]));
        assert_eq!(ctx.global("network"), Some(&json!("development")));
        assert_eq!(ctx.global_names().collect::<Vec<_>>(), vec!["accounts", "network"]);
    }

    #[test]
    fn test_install_loader_once() {
        let mut ctx = ExecutionContext::new();
        assert!(ctx.install_loader(Rc::new(Fixed("first"))));
        assert!(!ctx.install_loader(Rc::new(Fixed("second"))));
        let loaded = ctx.loader().unwrap().load(Path::new("x.ts")).unwrap();
        assert_eq!(loaded, "first");
    }

    #[test]
    fn test_snapshot_tracks_loader() {
        let mut ctx = ExecutionContext::new();
        ctx.set_global("web3", json!(null));
        let before = ctx.snapshot();
        assert_eq!(before, ctx.snapshot());

        ctx.install_loader(Rc::new(Fixed("")));
        assert_ne!(before, ctx.snapshot());
        assert_eq!(before.globals, ctx.snapshot().globals);
    }
}
