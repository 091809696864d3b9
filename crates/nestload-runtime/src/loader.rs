//! Delegating unit loader
//!
//! Resolution order is inverted relative to the usual "ask the parent first"
//! scheme: the loader's own search path is consulted before any fallback, so
//! units packaged in the bundle shadow same-named units provided elsewhere.
//!
//! ```text
//! resolve(name)
//!   1. cache hit?            → cached Arc<Unit>
//!   2. search path           → first archive holding the unit
//!   3. fallback resolvers    → first resolver that has it
//!   4. otherwise             → LoadError::UnitNotFound
//! ```
//!
//! Steps 1 and 2 happen under a per-name cell, so concurrent lookups of the
//! same name resolve once and share the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use nestload_archive::{DiscoveryOptions, ExtractionFailure, SearchPath, SearchPathBuilder, TempArena};
use once_cell::sync::OnceCell;

use crate::error::LoadError;
use crate::resolver::{Resolver, SearchPathResolver};
use crate::unit::{ResolvedUnit, UnitLayout};

/// Settings used to construct a [`DelegatingLoader`].
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Nested archive discovery settings.
    pub discovery: DiscoveryOptions,

    /// How unit names map to archive entries.
    pub layout: UnitLayout,

    /// Directory nested archives are extracted to (platform temp dir if unset).
    pub temp_dir: Option<PathBuf>,
}

/// Resolves units through its own search path first, then through an ordered
/// list of fallback resolvers, caching every successful resolution.
///
/// A loader is `Send + Sync` and meant to be shared across threads. The
/// temporary extraction files backing its search path are removed when the
/// loader is dropped.
pub struct DelegatingLoader {
    /// Archives discovered at construction; read-only afterwards.
    search_path: SearchPath,

    /// Resolvers in delegation order. The search path resolver comes first
    /// when the loader was built from an archive.
    chain: Vec<Arc<dyn Resolver>>,

    /// One cell per requested name; filled at most once.
    cache: DashMap<String, Arc<OnceCell<ResolvedUnit>>>,

    /// Owner of the extracted nested archives. Declared last so it is dropped last.
    arena: TempArena,
}

impl DelegatingLoader {
    /// Build a loader rooted at the archive at `root`.
    ///
    /// Discovers every nested archive, extracting them into a temporary arena.
    /// Nested archives that fail are recorded in [`failures`](Self::failures)
    /// unless the discovery policy is strict.
    /// A root that is not an archive, or cannot be opened, leaves the search
    /// path empty so only fallbacks resolve; under the strict policy an
    /// unreadable root is an error.
    pub fn open(root: &Path, options: &LoaderOptions) -> Result<Self, LoadError> {
        let mut arena = match &options.temp_dir {
            Some(dir) => TempArena::in_dir(dir),
            None => TempArena::new(),
        };
        let search_path = SearchPathBuilder::new(&options.discovery, &mut arena).build(root)?;

        tracing::info!(
            root = %root.display(),
            entries = search_path.len(),
            failures = search_path.failures().len(),
            "loader search path built"
        );

        let local = SearchPathResolver::new(&search_path, options.layout.clone());
        Ok(Self {
            search_path,
            chain: vec![Arc::new(local)],
            cache: DashMap::new(),
            arena,
        })
    }

    /// Build a loader with no archives, resolving only through `chain`.
    pub fn from_resolvers(chain: Vec<Arc<dyn Resolver>>) -> Self {
        Self {
            search_path: SearchPath::empty(),
            chain,
            cache: DashMap::new(),
            arena: TempArena::new(),
        }
    }

    /// Append a fallback resolver, consulted after everything already in the chain.
    pub fn with_fallback<R: Resolver + 'static>(mut self, resolver: R) -> Self {
        self.chain.push(Arc::new(resolver));
        self
    }

    /// Append an already shared fallback resolver.
    pub fn with_shared_fallback(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.chain.push(resolver);
        self
    }

    /// Resolve `name`, consulting the cache, then the search path, then the fallbacks.
    ///
    /// Successful results are cached for the life of the loader; repeated
    /// calls return the same `Arc`. Failed lookups are not cached.
    pub fn resolve(&self, name: &str) -> Result<ResolvedUnit, LoadError> {
        let cell = Arc::clone(
            self.cache
                .entry(name.to_string())
                .or_insert_with(Default::default)
                .value(),
        );
        // The map shard lock is released here; the cell serializes resolution of this name only.
        match cell.get_or_try_init(|| self.resolve_uncached(name)) {
            Ok(unit) => Ok(Arc::clone(unit)),
            Err(err) => {
                // Drop the cell this call used while it is still empty.
                self.cache.remove_if(name, |_, current| {
                    Arc::ptr_eq(current, &cell) && current.get().is_none()
                });
                Err(err)
            }
        }
    }

    fn resolve_uncached(&self, name: &str) -> Result<ResolvedUnit, LoadError> {
        for resolver in &self.chain {
            if let Some(unit) = resolver.resolve(name) {
                tracing::debug!(unit = name, resolver = resolver.label(), "unit resolved");
                return Ok(Arc::new(unit));
            }
        }
        tracing::debug!(unit = name, "unit not found");
        Err(LoadError::UnitNotFound(name.to_string()))
    }

    /// The search path built at construction.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Nested archives skipped while building the search path.
    pub fn failures(&self) -> &[ExtractionFailure] {
        self.search_path.failures()
    }

    /// Whether `name` has been resolved and cached.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache
            .get(name)
            .map_or(false, |cell| cell.get().is_some())
    }

    /// Names of all cached units, sorted.
    pub fn cached_units(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Labels of the resolvers in delegation order.
    pub fn resolver_labels(&self) -> Vec<&str> {
        self.chain.iter().map(|r| r.label()).collect()
    }

    /// Temporary files owned by this loader.
    pub fn arena(&self) -> &TempArena {
        &self.arena
    }
}

impl std::fmt::Debug for DelegatingLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatingLoader")
            .field("search_path", &self.search_path.locations())
            .field("resolvers", &self.resolver_labels())
            .field("cached", &self.cache.len())
            .finish()
    }
}
