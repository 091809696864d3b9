//! Loose unit files on disk.

use std::io;
use std::path::{Path, PathBuf};

use super::Resolver;
use crate::unit::{Unit, UnitLayout, UnitOrigin};

/// Resolves units from files under a directory, using the same layout as
/// archives (`<dir>/com/example/Main.unit`).
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
    layout: UnitLayout,
    label: String,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>, layout: UnitLayout) -> Self {
        let root = root.into();
        let label = format!("dir:{}", root.display());
        Self {
            root,
            layout,
            label,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Resolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Option<Unit> {
        for candidate in self.layout.candidates(name) {
            let path = self.root.join(&candidate);
            match std::fs::read(&path) {
                Ok(bytes) => return Some(Unit::new(name, UnitOrigin::File(path), bytes)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read unit file");
                }
            }
        }
        None
    }

    fn label(&self) -> &str {
        &self.label
    }
}
