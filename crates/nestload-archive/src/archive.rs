//! Opened zip archives.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::ArchiveError;

/// Upper bound on the buffer reserved up front by [`Archive::read`].
const READ_PREALLOC_LIMIT: u64 = 1 << 20;

/// Name and kind of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Position in the archive's own enumeration order.
    pub index: usize,

    /// Full entry name, `/`-separated.
    pub name: String,

    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// A zip archive opened from a filesystem location.
pub struct Archive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl Archive {
    /// Open the archive at `path`.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|e| ArchiveError::Open {
            path: path.to_path_buf(),
            source: ZipError::Io(e),
        })?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Location this archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries, directories included.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Describe the entry at `index`.
    pub fn entry(&mut self, index: usize) -> Result<EntryInfo, ArchiveError> {
        let entry = self.zip.by_index(index).map_err(|e| ArchiveError::Entry {
            archive: self.path.clone(),
            index,
            source: e,
        })?;
        Ok(EntryInfo {
            index,
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
        })
    }

    /// All entry names, in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Check whether a file entry named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    /// Read the full contents of the entry named `name`.
    ///
    /// Returns `Ok(None)` when the archive has no such entry.
    pub fn read(&mut self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e)),
        };
        // Declared sizes come from the archive header and may be bogus.
        let mut data = Vec::with_capacity(entry.size().min(READ_PREALLOC_LIMIT) as usize);
        entry.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Copy the entry at `index` into `out`, returning the byte count.
    pub(crate) fn copy_entry<W: io::Write>(&mut self, index: usize, out: &mut W) -> io::Result<u64> {
        let mut entry = self
            .zip
            .by_index(index)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        io::copy(&mut entry, out)
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.zip.len())
            .finish()
    }
}
