//! Compile-and-run coverage for the external toolchain backends.

use crate::{has_command, run};

#[tokio::test]
async fn cpp_addition_prints_three() {
    if !has_command("g++", "--version").await && !has_command("clang++", "--version").await {
        eprintln!("skipping: no C++ compiler available");
        return;
    }

    let code = r#"
#include <iostream>
int main() {
    std::cout << 1 + 2 << std::endl;
    return 0;
}
"#;
    let response = run("cpp", code).await;
    let output = response.output.unwrap_or_else(|| {
        panic!("expected output, got error: {:?}", response.error)
    });
    assert!(output.contains("3"));
}

#[tokio::test]
async fn c_hello_world() {
    if !has_command("gcc", "--version").await && !has_command("clang", "--version").await {
        eprintln!("skipping: no C compiler available");
        return;
    }

    let code = r#"
#include <stdio.h>
int main(void) {
    printf("hello from c\n");
    return 0;
}
"#;
    let response = run("c", code).await;
    assert_eq!(response.output.as_deref(), Some("hello from c"));
}

#[tokio::test]
async fn rust_hello_world() {
    if !has_command("rustc", "--version").await {
        eprintln!("skipping: rustc not available");
        return;
    }

    let code = r#"fn main() { println!("hello from rust"); }"#;
    let response = run("rust", code).await;
    assert_eq!(response.output.as_deref(), Some("hello from rust"));
}

#[tokio::test]
async fn java_class_name_is_extracted() {
    if !has_command("javac", "-version").await || !has_command("java", "-version").await {
        eprintln!("skipping: JDK not available");
        return;
    }

    let code = r#"
public class Greeter {
    public static void main(String[] args) {
        System.out.println("hello from java");
    }
}
"#;
    let response = run("java", code).await;
    assert_eq!(response.output.as_deref(), Some("hello from java"));
}

#[tokio::test]
async fn cpp_compile_error_carries_diagnostics() {
    if !has_command("g++", "--version").await && !has_command("clang++", "--version").await {
        eprintln!("skipping: no C++ compiler available");
        return;
    }

    let code = "int main() { this is not c++ }";
    let response = run("cpp", code).await;
    let error = response.error.expect("broken code must fail to compile");
    assert!(!error.is_empty());
    assert!(response.output.is_none());
}

#[tokio::test]
async fn silent_c_program_reports_canned_success() {
    if !has_command("gcc", "--version").await && !has_command("clang", "--version").await {
        eprintln!("skipping: no C compiler available");
        return;
    }

    let code = "int main(void) { return 0; }";
    let response = run("c", code).await;
    assert_eq!(
        response.output.as_deref(),
        Some("Code executed successfully (no output)")
    );
}

#[tokio::test]
async fn go_source_compiles_through_tinygo() {
    if !has_command("tinygo", "version").await {
        eprintln!("skipping: tinygo not available");
        return;
    }

    let code = r#"
package main

func main() {
}
"#;
    let response = run("go", code).await;
    // TinyGo's wasm output exports _start; the host has no stdout capture
    assert_eq!(
        response.output.as_deref(),
        Some("_start executed (no stdout capture)")
    );
}
