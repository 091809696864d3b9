//! Search path discovery
//!
//! Walks a root archive and every archive nested inside it, depth-first and
//! pre-order, producing the ordered list of locations units are looked up in:
//!
//! ```text
//! app.jar                 → entry 0 (root)
//! ├── lib/a.jar           → entry 1 (extracted)
//! │   └── deep/b.jar      → entry 2 (extracted)
//! └── lib/c.jar           → entry 3 (extracted)
//! ```
//!
//! Nested archives are recognized purely by entry name suffix, and so is the
//! root: a root without an archive suffix contributes nothing and the search
//! path stays empty. Archives that cannot be extracted or opened are either
//! recorded and skipped ([`FailurePolicy::BestEffort`]) or abort the build
//! ([`FailurePolicy::Strict`]). The root is no exception.
//! Packaging tools are assumed not to produce self-containing archives; there is
//! no cycle guard and no depth limit.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::arena::TempArena;
use crate::archive::Archive;
use crate::error::{ArchiveError, BuildError, ExtractionFailure};
use crate::extract::ArchiveExtractor;
use crate::suffix::ArchiveSuffixes;

/// What to do when a nested archive cannot be extracted or opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure, skip that branch and keep discovering.
    #[default]
    BestEffort,

    /// Abort the whole build on the first failure.
    Strict,
}

/// Settings for nested archive discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Entry name suffixes treated as nested archives.
    pub suffixes: ArchiveSuffixes,

    /// Failure handling for nested archives.
    pub policy: FailurePolicy,
}

/// How a search path entry was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// The archive discovery started from.
    Root,

    /// Extracted from entry `entry` of the search path entry at `parent`.
    Nested { parent: usize, entry: String },
}

/// One location in the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathEntry {
    index: usize,
    location: PathBuf,
    origin: EntryOrigin,
}

impl SearchPathEntry {
    /// Discovery order; lower indices are searched first.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Filesystem location of the archive (a temp file for nested archives).
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn origin(&self) -> &EntryOrigin {
        &self.origin
    }

    pub fn is_root(&self) -> bool {
        matches!(self.origin, EntryOrigin::Root)
    }
}

/// Ordered search path plus the nested archives that could not be added to it.
#[derive(Debug, Default)]
pub struct SearchPath {
    entries: Vec<SearchPathEntry>,
    failures: Vec<ExtractionFailure>,
    root_error: Option<ArchiveError>,
}

impl SearchPath {
    /// A search path with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SearchPathEntry] {
        &self.entries
    }

    /// Nested archives skipped under [`FailurePolicy::BestEffort`].
    pub fn failures(&self) -> &[ExtractionFailure] {
        &self.failures
    }

    /// Why the root archive was left out, when it could not be opened.
    pub fn root_error(&self) -> Option<&ArchiveError> {
        self.root_error.as_ref()
    }

    pub fn get(&self, index: usize) -> Option<&SearchPathEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchPathEntry> {
        self.entries.iter()
    }

    /// Entry locations in search order.
    pub fn locations(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.location()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'p> IntoIterator for &'p SearchPath {
    type Item = &'p SearchPathEntry;
    type IntoIter = std::slice::Iter<'p, SearchPathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a [`SearchPath`] from a root archive, extracting nested archives
/// into the given arena.
pub struct SearchPathBuilder<'a> {
    options: &'a DiscoveryOptions,
    arena: &'a mut TempArena,
    path: SearchPath,
}

impl<'a> SearchPathBuilder<'a> {
    pub fn new(options: &'a DiscoveryOptions, arena: &'a mut TempArena) -> Self {
        Self {
            options,
            arena,
            path: SearchPath::empty(),
        }
    }

    /// Discover every archive reachable from `root`.
    ///
    /// The root, when usable, is always entry 0. A root whose name has no
    /// archive suffix is not searched. A root that cannot be opened is kept in
    /// [`SearchPath::root_error`] under [`FailurePolicy::BestEffort`] and is an
    /// error under [`FailurePolicy::Strict`].
    pub fn build(mut self, root: &Path) -> Result<SearchPath, BuildError> {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if !self.options.suffixes.is_archive(&name) {
            tracing::info!(root = %root.display(), "root is not an archive, search path left empty");
            return Ok(self.path);
        }

        let mut archive = match Archive::open(root) {
            Ok(archive) => archive,
            Err(cause) => {
                if self.options.policy == FailurePolicy::Strict {
                    return Err(BuildError::Root(cause));
                }
                tracing::warn!(root = %root.display(), error = %cause, "root archive unreadable, search path left empty");
                self.path.root_error = Some(cause);
                return Ok(self.path);
            }
        };
        let index = self.push(root.to_path_buf(), EntryOrigin::Root);
        self.walk(&mut archive, index)?;
        Ok(self.path)
    }

    fn walk(&mut self, archive: &mut Archive, parent: usize) -> Result<(), BuildError> {
        for index in 0..archive.len() {
            let entry = match archive.entry(index) {
                Ok(entry) => entry,
                Err(cause) => {
                    self.fail(archive.path(), format!("#{}", index), cause)?;
                    continue;
                }
            };

            if entry.is_dir || !self.options.suffixes.is_archive(&entry.name) {
                continue;
            }

            let location = match ArchiveExtractor::new(&mut *self.arena).extract(archive, &entry) {
                Ok(location) => location,
                Err(cause) => {
                    self.fail(archive.path(), entry.name, cause)?;
                    continue;
                }
            };

            let mut nested = match Archive::open(&location) {
                Ok(nested) => nested,
                Err(cause) => {
                    self.fail(archive.path(), entry.name, cause)?;
                    continue;
                }
            };

            let child = self.push(
                location,
                EntryOrigin::Nested {
                    parent,
                    entry: entry.name,
                },
            );
            self.walk(&mut nested, child)?;
        }
        Ok(())
    }

    fn push(&mut self, location: PathBuf, origin: EntryOrigin) -> usize {
        let index = self.path.entries.len();
        tracing::debug!(index, location = %location.display(), "search path entry added");
        self.path.entries.push(SearchPathEntry {
            index,
            location,
            origin,
        });
        index
    }

    fn fail(&mut self, archive: &Path, entry: String, cause: ArchiveError) -> Result<(), BuildError> {
        tracing::warn!(archive = %archive.display(), entry = %entry, error = %cause, "skipping nested archive");
        let failure = ExtractionFailure {
            archive: archive.to_path_buf(),
            entry,
            cause,
        };
        match self.options.policy {
            FailurePolicy::Strict => Err(BuildError::Extraction(failure)),
            FailurePolicy::BestEffort => {
                self.path.failures.push(failure);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: FailurePolicy,
        }

        let strict: Wrapper = parse_policy("strict");
        assert_eq!(strict.policy, FailurePolicy::Strict);
        let lenient: Wrapper = parse_policy("best-effort");
        assert_eq!(lenient.policy, FailurePolicy::BestEffort);

        fn parse_policy(value: &str) -> Wrapper {
            use serde::de::value::{Error, MapDeserializer};
            let map = MapDeserializer::<_, Error>::new(std::iter::once(("policy", value)));
            Wrapper::deserialize(map).unwrap()
        }
    }

    #[test]
    fn test_missing_root_leaves_path_empty() {
        let dir = tempfile::tempdir().unwrap();
        let options = DiscoveryOptions::default();
        let mut arena = TempArena::in_dir(dir.path());

        let path = SearchPathBuilder::new(&options, &mut arena)
            .build(&dir.path().join("absent.jar"))
            .unwrap();

        assert!(path.is_empty());
        assert!(path.failures().is_empty());
        assert!(matches!(path.root_error(), Some(ArchiveError::Open { .. })));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_missing_root_is_error_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let options = DiscoveryOptions {
            policy: FailurePolicy::Strict,
            ..DiscoveryOptions::default()
        };
        let mut arena = TempArena::in_dir(dir.path());

        let err = SearchPathBuilder::new(&options, &mut arena)
            .build(&dir.path().join("absent.jar"))
            .unwrap_err();

        assert!(matches!(err, BuildError::Root(ArchiveError::Open { .. })));
    }

    #[test]
    fn test_root_without_archive_suffix_is_not_searched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nestload");
        std::fs::write(&root, b"\x7fELF not a zip").unwrap();

        for policy in [FailurePolicy::BestEffort, FailurePolicy::Strict] {
            let options = DiscoveryOptions {
                policy,
                ..DiscoveryOptions::default()
            };
            let mut arena = TempArena::in_dir(dir.path());
            let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

            assert!(path.is_empty());
            assert!(path.root_error().is_none());
        }
    }

    #[test]
    fn test_empty_search_path() {
        let path = SearchPath::empty();
        assert!(path.is_empty());
        assert!(path.failures().is_empty());
        assert!(path.root_error().is_none());
        assert!(path.get(0).is_none());
    }
}
