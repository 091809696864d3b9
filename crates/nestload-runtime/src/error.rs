//! Runtime error types.

use nestload_archive::{ArchiveError, BuildError, ExtractionFailure};

use crate::config::ConfigError;

/// Boxed error raised by an entry function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building a loader, resolving units, or
/// invoking entry points.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A nested archive failed under the strict failure policy
    #[error("{0}")]
    ExtractionFailed(#[source] ExtractionFailure),

    /// Neither the search path nor any fallback resolver has the unit
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    /// The unit resolved but does not export the entry symbol
    #[error("Unit '{unit}' has no entry point '{symbol}'")]
    EntryPointMissing { unit: String, symbol: String },

    /// The entry function itself failed
    #[error("Entry point of unit '{unit}' failed: {source}")]
    InvocationFailed {
        unit: String,
        #[source]
        source: BoxError,
    },

    /// The root archive could not be opened
    #[error("{0}")]
    Archive(#[from] ArchiveError),

    /// Configuration could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Discriminant of a [`LoadError`], for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ExtractionFailed,
    UnitNotFound,
    EntryPointMissing,
    InvocationFailed,
    Archive,
    Config,
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::ExtractionFailed(_) => ErrorKind::ExtractionFailed,
            LoadError::UnitNotFound(_) => ErrorKind::UnitNotFound,
            LoadError::EntryPointMissing { .. } => ErrorKind::EntryPointMissing,
            LoadError::InvocationFailed { .. } => ErrorKind::InvocationFailed,
            LoadError::Archive(_) => ErrorKind::Archive,
            LoadError::Config(_) => ErrorKind::Config,
        }
    }

    /// Name of the unit the error refers to, if any.
    pub fn unit(&self) -> Option<&str> {
        match self {
            LoadError::UnitNotFound(unit)
            | LoadError::EntryPointMissing { unit, .. }
            | LoadError::InvocationFailed { unit, .. } => Some(unit.as_str()),
            _ => None,
        }
    }
}

impl From<BuildError> for LoadError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Root(e) => LoadError::Archive(e),
            BuildError::Extraction(failure) => LoadError::ExtractionFailed(failure),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ExtractionFailed => "ExtractionFailed",
            ErrorKind::UnitNotFound => "UnitNotFound",
            ErrorKind::EntryPointMissing => "EntryPointMissing",
            ErrorKind::InvocationFailed => "InvocationFailed",
            ErrorKind::Archive => "Archive",
            ErrorKind::Config => "Config",
        };
        f.write_str(name)
    }
}
