//! Nestload Runtime
//!
//! Runs programs packaged as a root archive with archives nested inside it:
//! - **loader**: the delegating loader (local search path first, fallbacks after)
//! - **resolver**: resolver capabilities the loader chains together
//! - **unit**: resolved units and how unit names map to archive entries
//! - **invoke**: entry point lookup and invocation
//! - **config**: `nestload.toml` parsing
//! - **launcher**: command-line entry used by the `nestload` binary

pub mod config;
pub mod error;
pub mod invoke;
pub mod launcher;
pub mod loader;
pub mod resolver;
pub mod unit;

pub use config::{Config, ConfigError, CONFIG_FILE_NAME};
pub use error::{BoxError, ErrorKind, LoadError};
pub use invoke::{EntryFn, EntryPointInvoker, EntryPointReg, EntryResult, NativeSymbols, SymbolTable};
pub use loader::{DelegatingLoader, LoaderOptions};
pub use resolver::{DirectoryResolver, Resolver, SearchPathResolver, StaticResolver};
pub use unit::{ResolvedUnit, Unit, UnitLayout, UnitOrigin};

pub use nestload_archive::{ExtractionFailure, FailurePolicy, SearchPath, SearchPathEntry};

#[doc(hidden)]
pub use inventory;
