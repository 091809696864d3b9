//! In-memory units provided by the host.

use std::collections::HashMap;

use super::Resolver;
use crate::unit::{Unit, UnitOrigin};

/// A fixed set of units registered up front, standing in for units the
/// platform provides without any archive.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    units: HashMap<String, Vec<u8>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, builder style.
    pub fn with_unit(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a unit.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.units.insert(name.into(), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<Unit> {
        self.units
            .get(name)
            .map(|bytes| Unit::new(name, UnitOrigin::Static, bytes.clone()))
    }

    fn label(&self) -> &str {
        "static"
    }
}
