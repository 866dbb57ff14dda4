//! scriptload: prepare scripts for a plain-script runtime.
//!
//! ```bash
//! # Print executable source for a typed script
//! scriptload compile scripts/deploy.ts
//!
//! # Use a transpiler from a custom location
//! scriptload compile scripts/deploy.ts --transpiler ./tools/esbuild
//!
//! # Show how files would be handled
//! scriptload classify scripts/*.ts migrations/*.js
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=scriptload=debug` for details.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scriptload_compiler::{CompilerConfig, ScriptCompiler, ScriptKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "scriptload",
    version,
    about = "Compile typed scripts to plain script source"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the executable source of a script
    Compile {
        /// Script to compile
        file: PathBuf,

        /// Working directory (overrides the config file)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Transpiler executable name or path (overrides config and environment)
        #[arg(long)]
        transpiler: Option<String>,
    },

    /// Print whether each file is a typed or a plain script
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scriptload=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            file,
            cwd,
            config,
            transpiler,
        } => compile(file, cwd, config, transpiler),
        Commands::Classify { files } => {
            let mut stdout = std::io::stdout().lock();
            for file in files {
                writeln!(stdout, "{}\t{}", ScriptKind::classify(&file), file.display())?;
            }
            Ok(())
        }
    }
}

fn compile(
    file: PathBuf,
    cwd: Option<PathBuf>,
    config_path: Option<PathBuf>,
    transpiler: Option<String>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    }
    .with_env_overrides();
    if let Some(transpiler) = transpiler {
        config.transpiler = transpiler;
    }
    if let Some(cwd) = cwd {
        config.working_directory = cwd;
    }
    tracing::debug!(?config, "resolved configuration");

    let compiler = ScriptCompiler::from_config(&config);
    let source = compiler
        .compile_file(&config.working_directory, &file)
        .with_context(|| format!("failed to compile {}", file.display()))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(source.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
