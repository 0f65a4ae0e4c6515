//! Workspace hygiene: every compiled-backend path must leave the temp root
//! without its per-run directory, including failure paths.

use std::collections::HashSet;

use crate::{has_command, run};

fn workspace_dirs(prefix: &str) -> HashSet<String> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.starts_with(prefix))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn successful_run_removes_workspace() {
    if !has_command("gcc", "--version").await && !has_command("clang", "--version").await {
        eprintln!("skipping: no C compiler available");
        return;
    }

    let before = workspace_dirs("c-exec-");
    let response = run("c", "int main(void) { return 0; }").await;
    assert!(response.output.is_some());
    let after = workspace_dirs("c-exec-");
    assert_eq!(before, after, "run left a workspace behind");
}

#[tokio::test]
async fn failed_compile_removes_workspace() {
    if !has_command("gcc", "--version").await && !has_command("clang", "--version").await {
        eprintln!("skipping: no C compiler available");
        return;
    }

    let before = workspace_dirs("c-exec-");
    let response = run("c", "int main(void) { broken").await;
    assert!(response.error.is_some());
    let after = workspace_dirs("c-exec-");
    assert_eq!(before, after, "failed compile left a workspace behind");
}

#[tokio::test]
async fn runtime_failure_removes_workspace() {
    if !has_command("gcc", "--version").await && !has_command("clang", "--version").await {
        eprintln!("skipping: no C compiler available");
        return;
    }

    let before = workspace_dirs("c-exec-");
    let response = run("c", "int main(void) { return 3; }").await;
    assert!(response.error.is_some());
    let after = workspace_dirs("c-exec-");
    assert_eq!(before, after, "failing program left a workspace behind");
}
