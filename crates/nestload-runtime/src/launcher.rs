//! Command-line launcher
//!
//! `nestload [options] <unit> [args...]` locates the root archive, builds a
//! loader over it and runs the named unit's entry point with the remaining
//! arguments. Launcher options go before the unit; everything after it is
//! handed to the entry point untouched, `--help` included.
//! Exits 0 when the entry point returns normally and 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::LoadError;
use crate::invoke::{EntryPointInvoker, SymbolTable};
use crate::loader::DelegatingLoader;

/// Environment variable holding the log filter, e.g. `NESTLOAD_LOG=debug`.
pub const LOG_ENV: &str = "NESTLOAD_LOG";

#[derive(Debug, Parser)]
#[command(name = "nestload")]
#[command(about = "Run a unit packaged in a nested archive bundle", long_about = None)]
#[command(version)]
pub struct LaunchArgs {
    /// Fully-qualified name of the unit to run, then the arguments passed to its entry point
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "UNIT"
    )]
    command: Vec<String>,

    /// Root archive (overrides nestload.toml and NESTLOAD_ROOT)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Entry symbol to invoke
    #[arg(long, value_name = "SYMBOL")]
    pub entry: Option<String>,
}

impl LaunchArgs {
    /// Name of the unit to run.
    pub fn unit(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments following the unit name, verbatim.
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve configuration, build the loader and invoke the requested unit.
pub fn run(args: &LaunchArgs, symbols: &dyn SymbolTable) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let mut config = Config::discover(&cwd).context("Failed to load configuration")?;
    if let Some(root) = &args.root {
        config.archive.root = Some(cwd.join(root));
    }

    let loader = match &args.root {
        Some(_) => open_with_explicit_root(&config)?,
        None => config.open_loader().context("Failed to open root archive")?,
    };
    for failure in loader.failures() {
        tracing::warn!(
            archive = %failure.archive.display(),
            entry = %failure.entry,
            "nested archive skipped: {}",
            failure.cause
        );
    }

    let entry = args.entry.as_deref().unwrap_or(&config.units.entry);
    let invoker = EntryPointInvoker::new(&loader, symbols).with_entry(entry);
    invoker
        .invoke_main(args.unit(), args.args())
        .map_err(|e| describe(e, args.unit()))
}

/// `--root` wins over `NESTLOAD_ROOT`, which `Config::open_loader` would consult first.
fn open_with_explicit_root(config: &Config) -> anyhow::Result<DelegatingLoader> {
    let root = config
        .archive
        .root
        .as_deref()
        .context("Root archive not set")?;
    let mut loader = DelegatingLoader::open(root, &config.loader_options())
        .with_context(|| format!("Failed to open root archive {}", root.display()))?;
    for resolver in config.fallback_resolvers() {
        loader = loader.with_fallback(resolver);
    }
    Ok(loader)
}

fn describe(err: LoadError, unit: &str) -> anyhow::Error {
    let kind = err.kind();
    let unit = err.unit().unwrap_or(unit).to_string();
    anyhow::Error::new(err).context(format!("{} ({})", kind, unit))
}

/// Parse the process arguments and run. Used as the body of `main`.
pub fn launch(symbols: &dyn SymbolTable) -> ExitCode {
    init_logging();
    let args = LaunchArgs::parse();

    match run(&args, symbols) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
