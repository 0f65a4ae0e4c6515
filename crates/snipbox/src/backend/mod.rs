//! Language backends
//!
//! One module per execution strategy: spawned compiler toolchains for the
//! compiled languages, in-process evaluators for the interpreted ones, and
//! the WebAssembly host for precompiled modules.

use std::time::Duration;

pub mod compiled;
pub mod js;
pub mod lua;
pub mod php;
pub mod python;
pub mod wasm;

/// Budget for toolchain availability probes.
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed slice of the total budget reserved for running a compiled artifact;
/// whatever remains is the compile budget.
pub(crate) const EXECUTE_RESERVE: Duration = Duration::from_secs(3);

/// Execution budget for wasm modules produced by a compile step.
pub(crate) const WASM_CHAIN_BUDGET: Duration = Duration::from_secs(2);
