//! Unit resolvers
//!
//! A resolver is one link of the delegation chain: given a fully-qualified
//! unit name it either produces the unit or reports absence. The loader tries
//! its resolvers in order and stops at the first hit.
//!
//! - **search_path**: the loader's own archives (always first in the chain)
//! - **directory**: loose unit files under a directory
//! - **fixed**: units supplied in memory by the host

mod directory;
mod fixed;
mod search_path;

pub use directory::DirectoryResolver;
pub use fixed::StaticResolver;
pub use search_path::SearchPathResolver;

use crate::unit::Unit;

/// A capability that can look up units by name.
///
/// Absence is reported as `None`; implementations log and swallow their own
/// I/O trouble so that the next resolver in the chain still gets a chance.
pub trait Resolver: Send + Sync {
    /// Look up `name`, returning the loaded unit if this resolver has it.
    fn resolve(&self, name: &str) -> Option<Unit>;

    /// Short description used in diagnostics.
    fn label(&self) -> &str {
        "custom"
    }
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Option<Unit> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Unit> {
        self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitOrigin;

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| {
            (name == "only.This").then(|| Unit::new(name, UnitOrigin::Static, Vec::new()))
        };

        assert_eq!(resolver.label(), "custom");
        assert!(Resolver::resolve(&resolver, "only.This").is_some());
        assert!(Resolver::resolve(&resolver, "other.Unit").is_none());
    }
}
