//! Error taxonomy for snippet execution
//!
//! Every failure kind collapses to a single human-readable message in the
//! response; no kind is retried. Cleanup failures are logged and swallowed
//! by the owning component and never appear here.

use thiserror::Error;

/// Errors produced while executing a snippet.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No usable toolchain was found. The message is an actionable
    /// installation hint, not a generic failure.
    #[error("{0}")]
    ToolchainUnavailable(String),

    /// Compilation failed; compiler diagnostic text is preserved verbatim.
    #[error("{0}")]
    CompileFailure(String),

    /// Compilation reported success but the expected artifact is missing.
    #[error("Compilation completed but {0}")]
    ArtifactMissing(String),

    /// The program (or evaluator) failed at runtime.
    #[error("{0}")]
    RuntimeFault(String),

    /// The deadline elapsed before the backend produced a result.
    #[error("Execution timed out")]
    Timeout,

    /// Bad encoding, invalid binary header, or an unsupported language tag.
    #[error("{0}")]
    MalformedInput(String),

    /// The request is well-formed but asks for something the backend does
    /// not provide (e.g. a module without a recognized entry point).
    #[error("{0}")]
    UnsupportedFeature(String),

    /// Host-side I/O failure while staging or reading back files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Check whether this error represents an elapsed deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunnerError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_stable() {
        assert_eq!(RunnerError::Timeout.to_string(), "Execution timed out");
    }

    #[test]
    fn unsupported_language_message_passes_through() {
        let err = RunnerError::MalformedInput("Language cobol not supported".to_owned());
        assert_eq!(err.to_string(), "Language cobol not supported");
    }

    #[test]
    fn artifact_missing_prefixes_message() {
        let err = RunnerError::ArtifactMissing("binary was not created".to_owned());
        assert!(err.to_string().starts_with("Compilation completed but"));
    }

    #[test]
    fn is_timeout_only_for_timeout() {
        assert!(RunnerError::Timeout.is_timeout());
        assert!(!RunnerError::RuntimeFault("x".to_owned()).is_timeout());
    }
}
