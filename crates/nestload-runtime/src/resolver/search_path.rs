//! Resolution through the loader's own search path.

use std::collections::HashSet;
use std::path::PathBuf;

use nestload_archive::{Archive, SearchPath};

use super::Resolver;
use crate::unit::{Unit, UnitLayout, UnitOrigin};

/// Entry names of one search path archive, indexed at construction.
struct IndexedArchive {
    index: usize,
    location: PathBuf,
    names: HashSet<String>,
}

/// Looks units up in search path order; the first archive holding the unit wins.
///
/// Each archive's entry names are read once up front, so a lookup only opens
/// the archive that actually holds the unit.
pub struct SearchPathResolver {
    archives: Vec<IndexedArchive>,
    layout: UnitLayout,
}

impl SearchPathResolver {
    pub fn new(search_path: &SearchPath, layout: UnitLayout) -> Self {
        let archives = search_path
            .iter()
            .map(|entry| {
                let names = match Archive::open(entry.location()) {
                    Ok(archive) => archive.names().map(str::to_string).collect(),
                    Err(e) => {
                        tracing::warn!(index = entry.index(), error = %e, "search path entry unreadable");
                        HashSet::new()
                    }
                };
                IndexedArchive {
                    index: entry.index(),
                    location: entry.location().to_path_buf(),
                    names,
                }
            })
            .collect();
        Self { archives, layout }
    }

    pub fn layout(&self) -> &UnitLayout {
        &self.layout
    }

    fn read(&self, archive: &IndexedArchive, entry: &str) -> Option<Vec<u8>> {
        let result = Archive::open(&archive.location)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .and_then(|mut opened| opened.read(entry));
        match result {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    location = %archive.location.display(),
                    entry,
                    error = %e,
                    "failed to read unit from search path"
                );
                None
            }
        }
    }
}

impl Resolver for SearchPathResolver {
    fn resolve(&self, name: &str) -> Option<Unit> {
        let candidates = self.layout.candidates(name);
        for archive in &self.archives {
            for candidate in &candidates {
                if !archive.names.contains(candidate) {
                    continue;
                }
                if let Some(bytes) = self.read(archive, candidate) {
                    let origin = UnitOrigin::SearchPath {
                        index: archive.index,
                        location: archive.location.clone(),
                        entry: candidate.clone(),
                    };
                    return Some(Unit::new(name, origin, bytes));
                }
            }
        }
        None
    }

    fn label(&self) -> &str {
        "search-path"
    }
}
