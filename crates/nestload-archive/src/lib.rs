//! Nestload Archive Library
//!
//! Discovers archives nested inside a root archive and lays them out as an
//! ordered search path:
//! - **suffix**: archive-type recognition by file name
//! - **arena**: temporary extraction files owned by one loader
//! - **archive**: thin wrapper over an opened zip archive
//! - **extract**: copies a nested archive entry into the arena
//! - **search_path**: depth-first discovery and the resulting search path

pub mod arena;
pub mod archive;
pub mod error;
pub mod extract;
pub mod search_path;
pub mod suffix;

pub use arena::TempArena;
pub use archive::{Archive, EntryInfo};
pub use error::{ArchiveError, BuildError, ExtractionFailure};
pub use extract::ArchiveExtractor;
pub use search_path::{
    DiscoveryOptions, EntryOrigin, FailurePolicy, SearchPath, SearchPathBuilder, SearchPathEntry,
};
pub use suffix::{ArchiveSuffixes, DEFAULT_SUFFIXES};
