//! Integration tests for snipbox
//!
//! These tests require external compiler toolchains (gcc/g++ or clang,
//! rustc, javac, tinygo) and skip themselves when a toolchain is missing.
//! Run with: cargo test -p snipbox --features integration-tests

#![cfg(feature = "integration-tests")]

use std::process::Stdio;

use snipbox::{ExecutionRequest, Runner, RunResponse};

mod compiled_languages;
mod workspace_cleanup;

/// Check whether a toolchain binary answers its version probe.
pub(crate) async fn has_command(program: &str, arg: &str) -> bool {
    tokio::process::Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

pub(crate) async fn run(language: &str, code: &str) -> RunResponse {
    let runner = Runner::default();
    runner
        .run("integration-test", &ExecutionRequest::new(language, code))
        .await
}
