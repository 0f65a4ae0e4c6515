//! A library for executing untrusted code snippets.
//!
//! Snipbox provides an async Rust API for running short programs in a mix of
//! backends: in-process evaluators for JavaScript, Python and Lua, external
//! compiler toolchains for C, C++, Rust, Java and Go, and a WebAssembly host
//! for precompiled modules. Every call is bounded by a per-language budget
//! and folds into a stable response shape.
//!
//! # Features
//!
//! - **One dispatch surface** — `Runner::run` maps a language tag onto its backend.
//! - **In-process interpreters** — boa, rustpython and mlua evaluators, fresh per call.
//! - **Compiler toolchains** — probe-based candidate selection with install hints.
//! - **WebAssembly host** — fuel-metered wasmtime execution with stubbed imports.
//! - **Timeout discipline** — wall-clock race plus in-engine step budgets.
//! - **TOML configuration** — per-toolchain compiler and launcher settings.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Toolchain};
pub use dispatch::Runner;
pub use error::RunnerError;
pub use types::{ExecutionRequest, LanguageTag, RunResponse};

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod sniff;
pub mod timeout;
pub mod types;
pub mod workspace;
