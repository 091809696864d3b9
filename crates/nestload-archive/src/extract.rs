//! Nested archive extraction.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::arena::TempArena;
use crate::archive::{Archive, EntryInfo};
use crate::error::ArchiveError;

/// Copies nested archive entries out of their parent into arena-owned files.
pub struct ArchiveExtractor<'a> {
    arena: &'a mut TempArena,
}

impl<'a> ArchiveExtractor<'a> {
    pub fn new(arena: &'a mut TempArena) -> Self {
        Self { arena }
    }

    /// Extract `entry` of `archive` into a fresh temporary file and return its path.
    ///
    /// The temporary file keeps the entry's base name and suffix. It belongs to
    /// the arena from the moment it is created, including when the copy fails.
    pub fn extract(
        &mut self,
        archive: &mut Archive,
        entry: &EntryInfo,
    ) -> Result<PathBuf, ArchiveError> {
        let (file, path) = self
            .arena
            .allocate(&entry.name)
            .map_err(|e| copy_error(archive, entry, e))?;
        let mut out = BufWriter::new(file);
        let copied = archive
            .copy_entry(entry.index, &mut out)
            .and_then(|n| out.flush().map(|_| n))
            .map_err(|e| copy_error(archive, entry, e))?;

        tracing::trace!(entry = %entry.name, bytes = copied, to = %path.display(), "extracted nested archive");
        Ok(path)
    }
}

fn copy_error(archive: &Archive, entry: &EntryInfo, source: io::Error) -> ArchiveError {
    ArchiveError::Copy {
        archive: archive.path().to_path_buf(),
        entry: entry.name.clone(),
        source,
    }
}
