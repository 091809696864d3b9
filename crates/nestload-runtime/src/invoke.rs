//! Entry point lookup and invocation
//!
//! How a resolved unit's bytes become callable code is outside the loader's
//! concern. The loader only needs a [`SymbolTable`] that, given a unit and a
//! symbol name, hands back something callable with the program arguments.
//!
//! [`NativeSymbols`] is the table used by the launcher: entry functions are
//! registered against unit names, either explicitly or at link time with
//! [`entry_point!`](crate::entry_point).

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::DEFAULT_ENTRY;
use crate::error::{BoxError, LoadError};
use crate::loader::DelegatingLoader;
use crate::unit::Unit;

/// Result of running an entry function.
pub type EntryResult = Result<(), BoxError>;

/// A callable entry function.
pub type EntryFn = Arc<dyn Fn(&[String]) -> EntryResult + Send + Sync>;

/// Dynamic symbol lookup on resolved units.
pub trait SymbolTable: Send + Sync {
    /// Find `symbol` on `unit`, or `None` if the unit does not export it.
    fn lookup(&self, unit: &Unit, symbol: &str) -> Option<EntryFn>;
}

/// Link-time registration of an entry function.
///
/// Submitted through [`entry_point!`](crate::entry_point) and collected by
/// [`NativeSymbols::from_inventory`].
pub struct EntryPointReg {
    pub unit: &'static str,
    pub symbol: &'static str,
    pub func: fn(&[String]) -> EntryResult,
}

inventory::collect!(EntryPointReg);

/// Registers a native entry function for a unit at link time.
///
/// ```rust,ignore
/// fn run(args: &[String]) -> nestload_runtime::EntryResult {
///     println!("{:?}", args);
///     Ok(())
/// }
///
/// nestload_runtime::entry_point!("com.example.Main", run);
/// nestload_runtime::entry_point!("com.example.Tool", "start", run);
/// ```
#[macro_export]
macro_rules! entry_point {
    ($unit:expr, $func:path) => {
        $crate::entry_point!($unit, "main", $func);
    };
    ($unit:expr, $symbol:expr, $func:path) => {
        $crate::inventory::submit! {
            $crate::EntryPointReg {
                unit: $unit,
                symbol: $symbol,
                func: $func,
            }
        }
    };
}

/// Entry functions keyed by unit name and symbol.
#[derive(Default)]
pub struct NativeSymbols {
    table: RwLock<HashMap<(String, String), EntryFn>>,
}

impl NativeSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding every entry point submitted with [`entry_point!`](crate::entry_point).
    pub fn from_inventory() -> Self {
        let symbols = Self::new();
        for reg in inventory::iter::<EntryPointReg> {
            let func = reg.func;
            symbols.register(reg.unit, reg.symbol, move |args: &[String]| func(args));
        }
        symbols
    }

    /// Register (or replace) `symbol` on unit `unit`.
    pub fn register<F>(&self, unit: impl Into<String>, symbol: impl Into<String>, func: F)
    where
        F: Fn(&[String]) -> EntryResult + Send + Sync + 'static,
    {
        self.table
            .write()
            .insert((unit.into(), symbol.into()), Arc::new(func));
    }

    pub fn contains(&self, unit: &str, symbol: &str) -> bool {
        self.table
            .read()
            .contains_key(&(unit.to_string(), symbol.to_string()))
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl SymbolTable for NativeSymbols {
    fn lookup(&self, unit: &Unit, symbol: &str) -> Option<EntryFn> {
        self.table
            .read()
            .get(&(unit.name().to_string(), symbol.to_string()))
            .cloned()
    }
}

/// Resolves a unit through a loader and runs its entry function once.
pub struct EntryPointInvoker<'a> {
    loader: &'a DelegatingLoader,
    symbols: &'a dyn SymbolTable,
    entry: String,
}

impl<'a> EntryPointInvoker<'a> {
    pub fn new(loader: &'a DelegatingLoader, symbols: &'a dyn SymbolTable) -> Self {
        Self {
            loader,
            symbols,
            entry: DEFAULT_ENTRY.to_string(),
        }
    }

    /// Use `symbol` instead of `main` as the entry function.
    pub fn with_entry(mut self, symbol: impl Into<String>) -> Self {
        self.entry = symbol.into();
        self
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Resolve `unit_name` and invoke its entry function with `args`.
    ///
    /// Fails with `UnitNotFound` if the unit cannot be resolved,
    /// `EntryPointMissing` if it has no entry function, and `InvocationFailed`
    /// if the entry function returns an error or panics.
    pub fn invoke_main(&self, unit_name: &str, args: &[String]) -> Result<(), LoadError> {
        let unit = self.loader.resolve(unit_name)?;
        let func = self
            .symbols
            .lookup(&unit, &self.entry)
            .ok_or_else(|| LoadError::EntryPointMissing {
                unit: unit_name.to_string(),
                symbol: self.entry.clone(),
            })?;

        tracing::debug!(unit = unit_name, symbol = %self.entry, args = args.len(), "invoking entry point");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| func(args))).unwrap_or_else(|panic| {
            let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(format!("entry point panicked: {}", msg).into())
        });

        outcome.map_err(|source| LoadError::InvocationFailed {
            unit: unit_name.to_string(),
            source,
        })
    }
}
