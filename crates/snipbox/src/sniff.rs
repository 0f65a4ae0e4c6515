//! Source-code sniffing
//!
//! Classifies a payload that might be either compilable source text or a
//! base64-encoded binary by scanning for language-level syntactic markers.
//! The heuristic is keyword-substring based and can misclassify minified or
//! obfuscated source; the behavior is kept as-is deliberately.

use std::sync::OnceLock;

use regex::Regex;

/// Source language detected in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Go,
    COrCpp,
    Rust,
    Java,
}

impl SourceLanguage {
    /// Human-readable name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::Go => "Go",
            SourceLanguage::COrCpp => "C/C++",
            SourceLanguage::Rust => "Rust",
            SourceLanguage::Java => "Java",
        }
    }

    /// Actionable hint naming the toolchain that compiles this language to
    /// WebAssembly.
    #[must_use]
    pub fn wasm_toolchain_hint(&self) -> String {
        match self {
            SourceLanguage::Go => {
                "For Go, use TinyGo: tinygo build -target wasm -o output.wasm yourfile.go".to_owned()
            }
            SourceLanguage::COrCpp => {
                "For C/C++, use Emscripten: emcc yourfile.c -o output.wasm".to_owned()
            }
            SourceLanguage::Rust => {
                "For Rust, use: rustc --target wasm32-unknown-unknown yourfile.rs".to_owned()
            }
            SourceLanguage::Java => {
                format!("For {}, you'll need to use the appropriate compiler.", self.name())
            }
        }
    }
}

fn c_main_signature() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(int|void|char|float|double)\s+main\s*\(").expect("valid regex")
    })
}

/// Detect whether a payload looks like source code rather than an encoded
/// binary. Markers are checked in a fixed order; the first match wins.
pub fn detect_source(payload: &str) -> Option<SourceLanguage> {
    let trimmed = payload.trim();

    if trimmed.contains("package ") || trimmed.contains("import ") || trimmed.contains("func main()")
    {
        return Some(SourceLanguage::Go);
    }

    if trimmed.contains("#include") || c_main_signature().is_match(trimmed) {
        return Some(SourceLanguage::COrCpp);
    }

    if trimmed.contains("fn main()") || (trimmed.contains("use ") && trimmed.contains("::")) {
        return Some(SourceLanguage::Rust);
    }

    if trimmed.contains("public class") || trimmed.contains("public static void main") {
        return Some(SourceLanguage::Java);
    }

    None
}
