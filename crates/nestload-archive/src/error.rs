//! Archive error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or extracting archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file could not be opened or parsed as an archive
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry header could not be read
    #[error("Failed to read entry #{index} of {archive}: {source}")]
    Entry {
        archive: PathBuf,
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    /// Copying entry bytes to the temporary location failed
    #[error("Failed to copy '{entry}' out of {archive}: {source}")]
    Copy {
        archive: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },
}

/// A nested archive that could not be added to the search path.
///
/// Recorded alongside the built search path instead of aborting discovery.
#[derive(Debug, Error)]
#[error("Failed to extract nested archive '{entry}' from {archive}: {cause}")]
pub struct ExtractionFailure {
    /// Archive the entry belongs to.
    pub archive: PathBuf,

    /// Entry name inside `archive`.
    pub entry: String,

    /// What went wrong.
    #[source]
    pub cause: ArchiveError,
}

/// Errors that stop a search path from being built at all.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The root archive itself is unusable
    #[error(transparent)]
    Root(ArchiveError),

    /// A nested archive failed under [`FailurePolicy::Strict`](crate::FailurePolicy::Strict)
    #[error(transparent)]
    Extraction(ExtractionFailure),
}
