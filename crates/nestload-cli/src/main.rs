//! Nestload launcher
//!
//! Runs a unit packaged inside the root archive (by default, this executable).
//! Entry points linked into the binary with `nestload_runtime::entry_point!`
//! are available to the launched unit.

use std::process::ExitCode;

use nestload_runtime::{launcher, NativeSymbols};

fn main() -> ExitCode {
    let symbols = NativeSymbols::from_inventory();
    launcher::launch(&symbols)
}
