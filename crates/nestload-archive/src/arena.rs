//! Temporary extraction arena
//!
//! Every nested archive pulled out of its parent lands in a temporary file.
//! The arena owns those files and removes them when it is dropped, so their
//! lifetime is tied to the loader that built the search path rather than to
//! process exit.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Owner of the temporary files created during nested archive discovery.
#[derive(Debug)]
pub struct TempArena {
    /// Directory new files are allocated in.
    dir: PathBuf,

    /// Files allocated so far, deleted on drop.
    files: Vec<TempPath>,
}

impl TempArena {
    /// Create an arena allocating in the platform temporary directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Create an arena allocating in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Allocate a fresh file named after an archive entry.
    ///
    /// The entry's path separators are flattened and its suffix is kept, so
    /// `lib/inner.jar` becomes something like `lib_inner.a1B2c3.jar`. The file
    /// is registered before it is handed out; a failed copy still gets cleaned up.
    pub fn allocate(&mut self, entry_name: &str) -> io::Result<(File, PathBuf)> {
        let (prefix, suffix) = temp_name_parts(entry_name);
        let named = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (file, temp_path) = named.into_parts();
        let path = temp_path.to_path_buf();
        self.files.push(temp_path);
        Ok((file, path))
    }

    /// Directory new files are allocated in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths of every file allocated so far, in allocation order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|p| &**p)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for TempArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Split an entry name into a temp file prefix and suffix.
fn temp_name_parts(entry_name: &str) -> (String, String) {
    let flat = entry_name.replace(['/', '\\'], "_");
    match flat.rfind('.') {
        Some(dot) => (format!("{}.", &flat[..dot]), flat[dot..].to_string()),
        None => (format!("{}.", flat), String::new()),
    }
}
