//! Backend that drives a user-installed transpiler executable.
//!
//! The executable is resolved the way a package-manager install is found:
//! `node_modules/.bin` in the working directory or any ancestor, then
//! `PATH`. Each compile spawns the transpiler, writes the source to its
//! stdin and reads plain script back from stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use scriptload_types::{BackendError, CompileOptions, ModuleSystem, SourceMapMode};
use tracing::debug;

use crate::backend::{CompilationService, CompilerBackend};

/// Transpiler used when none is configured.
pub const DEFAULT_TRANSPILER: &str = "esbuild";

/// [`CompilerBackend`] backed by an external transpiler executable.
#[derive(Debug, Clone)]
pub struct ExternalBackend {
    program: String,
}

impl ExternalBackend {
    /// `program` is either a bare executable name or a path to one.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find the executable, searching from `cwd`.
    pub fn resolve(&self, cwd: &Path) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 || program.is_absolute() {
            let candidate = if program.is_absolute() {
                program.to_path_buf()
            } else {
                cwd.join(program)
            };
            return candidate.is_file().then_some(candidate);
        }

        cwd.ancestors()
            .map(|dir| dir.join("node_modules").join(".bin").join(&self.program))
            .find(|candidate| candidate.is_file())
            .or_else(|| find_in_path(&self.program))
    }
}

impl Default for ExternalBackend {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSPILER)
    }
}

impl CompilerBackend for ExternalBackend {
    fn package(&self) -> &str {
        &self.program
    }

    fn create(&self, options: &CompileOptions) -> Result<Box<dyn CompilationService>, BackendError> {
        let executable = self.resolve(&options.cwd).ok_or_else(|| BackendError::NotFound {
            package: self.program.clone(),
            searched_from: options.cwd.clone(),
        })?;
        debug!(executable = %executable.display(), "resolved transpiler");
        Ok(Box::new(ExternalService {
            package: self.program.clone(),
            executable,
            options: options.clone(),
        }))
    }
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// A resolved transpiler plus the options it runs with.
#[derive(Debug)]
pub struct ExternalService {
    package: String,
    executable: PathBuf,
    options: CompileOptions,
}

impl ExternalService {
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// An executable that resolved but cannot be started because something
    /// it needs (a shebang interpreter, a shared runtime) is missing counts
    /// as the dependency not being installed.
    fn spawn_error(&self, source: std::io::Error) -> BackendError {
        if source.kind() == std::io::ErrorKind::NotFound && self.options.cwd.is_dir() {
            debug!(executable = %self.executable.display(), error = %source, "transpiler peer missing");
            return BackendError::NotFound {
                package: self.package.clone(),
                searched_from: self.options.cwd.clone(),
            };
        }
        BackendError::Spawn {
            program: self.executable.clone(),
            source,
        }
    }
}

impl CompilationService for ExternalService {
    fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn compile(&self, source: &str, file: &Path) -> Result<String, BackendError> {
        let mut child = Command::new(&self.executable)
            .args(transpile_args(&self.options, file))
            .current_dir(&self.options.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        // Feed stdin from another thread so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "transpiler stdin unavailable")
        })?;
        let input = source.to_owned();
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("transpiler stdin writer panicked")));

        // A transpiler that rejects its input may exit before reading all of
        // it; its diagnostic matters more than the broken pipe.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Diagnostic {
                file: file.to_path_buf(),
                message: stderr.trim().to_string(),
            });
        }
        written?;

        String::from_utf8(output.stdout).map_err(|_| BackendError::Diagnostic {
            file: file.to_path_buf(),
            message: "transpiler produced non UTF-8 output".to_string(),
        })
    }
}

/// Command line for one transpile of `file`.
pub(crate) fn transpile_args(options: &CompileOptions, file: &Path) -> Vec<String> {
    let loader = match file.extension().and_then(|ext| ext.to_str()) {
        Some("tsx") => "tsx",
        _ => "ts",
    };
    let format = match options.module_system {
        ModuleSystem::CommonJs => "cjs",
        ModuleSystem::EsModules => "esm",
    };

    let mut args = vec![format!("--loader={loader}"), format!("--format={format}")];
    if options.source_map == SourceMapMode::Inline {
        args.push("--sourcemap=inline".to_string());
    }
    args.push(format!("--sourcefile={}", file.display()));
    args.push("--log-level=error".to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install(dir: &Path, name: &str) -> PathBuf {
        let bin = dir.join("node_modules").join(".bin");
        fs::create_dir_all(&bin).unwrap();
        let exe = bin.join(name);
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        exe
    }

    #[test]
    fn test_args_for_ts() {
        let args = transpile_args(&CompileOptions::new("/p"), Path::new("/p/deploy.ts"));
        assert_eq!(
            args,
            vec![
                "--loader=ts",
                "--format=cjs",
                "--sourcemap=inline",
                "--sourcefile=/p/deploy.ts",
                "--log-level=error",
            ]
        );
    }

    #[test]
    fn test_args_for_tsx_and_cts() {
        let opts = CompileOptions::new("/p");
        assert_eq!(transpile_args(&opts, Path::new("view.tsx"))[0], "--loader=tsx");
        assert_eq!(transpile_args(&opts, Path::new("legacy.cts"))[0], "--loader=ts");
    }

    #[test]
    fn test_args_without_source_map() {
        let mut opts = CompileOptions::new("/p");
        opts.source_map = SourceMapMode::None;
        opts.module_system = ModuleSystem::EsModules;
        let args = transpile_args(&opts, Path::new("a.ts"));
        assert!(args.contains(&"--format=esm".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--sourcemap")));
    }

    #[test]
    fn test_resolves_from_ancestor_node_modules() {
        let root = tempfile::tempdir().unwrap();
        let exe = install(root.path(), "scriptload-test-transpiler");
        let nested = root.path().join("scripts").join("deploy");
        fs::create_dir_all(&nested).unwrap();

        let backend = ExternalBackend::new("scriptload-test-transpiler");
        assert_eq!(backend.resolve(&nested), Some(exe));
    }

    #[test]
    fn test_nearest_node_modules_wins() {
        let root = tempfile::tempdir().unwrap();
        install(root.path(), "scriptload-test-transpiler");
        let nested = root.path().join("pkg");
        let near = install(&nested, "scriptload-test-transpiler");

        let backend = ExternalBackend::new("scriptload-test-transpiler");
        assert_eq!(backend.resolve(&nested), Some(near));
    }

    #[test]
    fn test_explicit_relative_path() {
        let root = tempfile::tempdir().unwrap();
        install(root.path(), "tool");
        let backend = ExternalBackend::new("node_modules/.bin/tool");
        assert!(backend.resolve(root.path()).is_some());

        let missing = ExternalBackend::new("node_modules/.bin/absent");
        assert!(missing.resolve(root.path()).is_none());
    }

    #[test]
    fn test_create_reports_not_found() {
        let root = tempfile::tempdir().unwrap();
        let backend = ExternalBackend::new("scriptload-no-such-transpiler-7f3a");
        match backend.create(&CompileOptions::new(root.path())) {
            Err(BackendError::NotFound { package, searched_from }) => {
                assert_eq!(package, "scriptload-no-such-transpiler-7f3a");
                assert_eq!(searched_from, root.path());
            }
            Err(other) => panic!("expected NotFound, got {other:?}"),
            Ok(_) => panic!("expected NotFound, got a service"),
        }
    }

    #[test]
    fn test_create_binds_options() {
        let root = tempfile::tempdir().unwrap();
        install(root.path(), "scriptload-test-transpiler");
        let backend = ExternalBackend::new("scriptload-test-transpiler");
        let service = backend.create(&CompileOptions::new(root.path())).unwrap();
        assert_eq!(service.options().cwd, root.path());
        assert_eq!(service.options().module_system, ModuleSystem::CommonJs);
    }
}
