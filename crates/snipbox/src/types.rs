use serde::{Deserialize, Serialize};

/// A request to execute one snippet of code.
///
/// Both fields must be non-empty; the language tag is trimmed and lowercased
/// before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Requested language tag (e.g. "js", "cpp", "wasm")
    pub language: String,

    /// Source text, or a base64-encoded module for the wasm backend
    pub code: String,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }
}

/// The terminal result of one run.
///
/// Exactly one of `output`/`error` is populated. The request id and the
/// normalized language tag are echoed back for correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub id: String,

    pub language: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResponse {
    /// Build a success response.
    pub fn success(id: impl Into<String>, language: impl Into<String>, output: String) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
            output: Some(output),
            error: None,
        }
    }

    /// Build a failure response.
    pub fn failure(id: impl Into<String>, language: impl Into<String>, error: String) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
            output: None,
            error: Some(error),
        }
    }

    /// Check whether the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}

/// Supported language tags after normalization.
///
/// Aliases ("js", "py") map onto the same variant as their long forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageTag {
    Javascript,
    Python,
    Lua,
    Php,
    Wasm,
    C,
    Cpp,
    Rust,
    Go,
    Zig,
    Java,
}

impl LanguageTag {
    /// Parse a normalized (trimmed, lowercased) tag. Returns `None` for
    /// unknown tags; the dispatcher turns that into an explicit
    /// "not supported" error without invoking any backend.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "javascript" | "js" => Some(LanguageTag::Javascript),
            "python" | "py" => Some(LanguageTag::Python),
            "lua" => Some(LanguageTag::Lua),
            "php" => Some(LanguageTag::Php),
            "wasm" => Some(LanguageTag::Wasm),
            "c" => Some(LanguageTag::C),
            "cpp" => Some(LanguageTag::Cpp),
            "rust" => Some(LanguageTag::Rust),
            "go" => Some(LanguageTag::Go),
            "zig" => Some(LanguageTag::Zig),
            "java" => Some(LanguageTag::Java),
            _ => None,
        }
    }

    /// Canonical tag used to look up toolchain configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Javascript => "javascript",
            LanguageTag::Python => "python",
            LanguageTag::Lua => "lua",
            LanguageTag::Php => "php",
            LanguageTag::Wasm => "wasm",
            LanguageTag::C => "c",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Rust => "rust",
            LanguageTag::Go => "go",
            LanguageTag::Zig => "zig",
            LanguageTag::Java => "java",
        }
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
