//! Scripted stand-in for an external transpiler.
//!
//! `FakeBackend` records every service it creates and every file it is asked
//! to compile. Its "transpile" strips simple `: Type` annotations and
//! `interface` declarations, which is enough for the scripts used in tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use scriptload_compiler::{BackendError, CompilationService, CompileOptions, CompilerBackend};

pub const PACKAGE: &str = "fake-tsc";

/// What the fake is told to do on `create`.
#[derive(Debug, Clone)]
pub enum Behavior {
    Works,
    Missing,
    Broken(String),
}

#[derive(Debug, Default)]
pub struct Log {
    pub created: Vec<CompileOptions>,
    pub compiled: Vec<PathBuf>,
}

pub struct FakeBackend {
    behavior: RefCell<Behavior>,
    pub log: Rc<RefCell<Log>>,
}

impl FakeBackend {
    pub fn new(behavior: Behavior) -> Rc<Self> {
        Rc::new(Self {
            behavior: RefCell::new(behavior),
            log: Rc::new(RefCell::new(Log::default())),
        })
    }

    pub fn working() -> Rc<Self> {
        Self::new(Behavior::Works)
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.borrow_mut() = behavior;
    }

    pub fn created(&self) -> usize {
        self.log.borrow().created.len()
    }

    pub fn compiled(&self) -> Vec<PathBuf> {
        self.log.borrow().compiled.clone()
    }
}

impl CompilerBackend for FakeBackend {
    fn package(&self) -> &str {
        PACKAGE
    }

    fn create(&self, options: &CompileOptions) -> Result<Box<dyn CompilationService>, BackendError> {
        match &*self.behavior.borrow() {
            Behavior::Works => {}
            Behavior::Missing => {
                return Err(BackendError::NotFound {
                    package: PACKAGE.to_string(),
                    searched_from: options.cwd.clone(),
                })
            }
            Behavior::Broken(message) => {
                return Err(BackendError::Diagnostic {
                    file: PathBuf::from("tsconfig.json"),
                    message: message.clone(),
                })
            }
        }
        self.log.borrow_mut().created.push(options.clone());
        Ok(Box::new(FakeService {
            options: options.clone(),
            log: Rc::clone(&self.log),
        }))
    }
}

struct FakeService {
    options: CompileOptions,
    log: Rc<RefCell<Log>>,
}

impl CompilationService for FakeService {
    fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn compile(&self, source: &str, file: &Path) -> Result<String, BackendError> {
        self.log.borrow_mut().compiled.push(file.to_path_buf());
        if source.contains("@@syntax-error@@") {
            return Err(BackendError::Diagnostic {
                file: file.to_path_buf(),
                message: "Unexpected token".to_string(),
            });
        }
        Ok(format!(
            "\"use strict\";\n{}// compiled {} in {}\n",
            strip_types(source),
            file.display(),
            self.options.cwd.display()
        ))
    }
}

/// Drop `interface` blocks and `: Ident` annotations.
pub fn strip_types(source: &str) -> String {
    let mut out = String::new();
    let mut in_interface = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("interface ") {
            in_interface = !trimmed.trim_end().ends_with('}');
            continue;
        }
        if in_interface {
            if trimmed.starts_with('}') {
                in_interface = false;
            }
            continue;
        }
        out.push_str(&strip_annotations(line));
        out.push('\n');
    }
    out
}

fn strip_annotations(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ':' {
            let mut j = i + 1;
            while j < chars.len() && chars[j] == ' ' {
                j += 1;
            }
            if j < chars.len() && chars[j].is_ascii_alphabetic() {
                while j < chars.len()
                    && (chars[j].is_ascii_alphanumeric() || "_<>[]".contains(chars[j]))
                {
                    j += 1;
                }
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Substrings that only typed-script code contains.
pub fn has_type_syntax(code: &str) -> bool {
    ["interface ", ": number", ": string", ": boolean", ": Account"]
        .iter()
        .any(|needle| code.contains(needle))
}
