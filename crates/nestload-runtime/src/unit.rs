//! Code units and their layout inside archives.

use std::path::PathBuf;
use std::sync::Arc;

/// Default file extension of a unit entry.
pub const DEFAULT_UNIT_EXTENSION: &str = ".unit";

/// Default prefixes units are looked up under inside an archive.
///
/// The empty prefix is the archive root; `WEB-INF/classes` covers web archives.
pub const DEFAULT_UNIT_ROOTS: &[&str] = &["", "WEB-INF/classes"];

/// Where a unit was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrigin {
    /// Entry `entry` of search path entry `index`, located at `location`.
    SearchPath {
        index: usize,
        location: PathBuf,
        entry: String,
    },

    /// A loose file found by a directory resolver.
    File(PathBuf),

    /// Supplied in memory by the host.
    Static,
}

/// A named, loaded code unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    name: String,
    origin: UnitOrigin,
    bytes: Vec<u8>,
}

impl Unit {
    pub fn new(name: impl Into<String>, origin: UnitOrigin, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            origin,
            bytes,
        }
    }

    /// Fully-qualified unit name, e.g. `com.example.Main`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &UnitOrigin {
        &self.origin
    }

    /// Raw unit contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the unit came from the loader's own search path.
    pub fn is_local(&self) -> bool {
        matches!(self.origin, UnitOrigin::SearchPath { .. })
    }
}

/// A unit shared out of the loader cache.
///
/// Two lookups of the same name on one loader return `Arc::ptr_eq` handles.
pub type ResolvedUnit = Arc<Unit>;

/// Maps fully-qualified unit names to entry paths.
///
/// `com.example.Main` with extension `.unit` and roots `["", "WEB-INF/classes"]`
/// is looked up as `com/example/Main.unit`, then
/// `WEB-INF/classes/com/example/Main.unit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLayout {
    extension: String,
    roots: Vec<String>,
}

impl UnitLayout {
    pub fn new<I, S>(extension: &str, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extension = match extension.trim() {
            "" => String::new(),
            ext if ext.starts_with('.') => ext.to_string(),
            ext => format!(".{}", ext),
        };
        let roots = roots
            .into_iter()
            .map(|r| r.as_ref().trim_matches('/').to_string())
            .collect();
        Self { extension, roots }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Relative entry path of `name`, without any root prefix.
    ///
    /// Returns `None` for names that cannot denote a unit: empty names, empty
    /// segments (`a..b`, `.a`), or segments containing path separators.
    pub fn relative_path(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let mut path = String::with_capacity(name.len() + self.extension.len());
        for (i, segment) in name.split('.').enumerate() {
            if segment.is_empty() || segment.contains(['/', '\\']) {
                return None;
            }
            if i > 0 {
                path.push('/');
            }
            path.push_str(segment);
        }
        path.push_str(&self.extension);
        Some(path)
    }

    /// Every entry path `name` may live at, in lookup order.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let Some(relative) = self.relative_path(name) else {
            return Vec::new();
        };
        self.roots
            .iter()
            .map(|root| {
                if root.is_empty() {
                    relative.clone()
                } else {
                    format!("{}/{}", root, relative)
                }
            })
            .collect()
    }
}

impl Default for UnitLayout {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_EXTENSION, DEFAULT_UNIT_ROOTS)
    }
}
