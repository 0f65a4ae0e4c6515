//! Output normalization
//!
//! Shapes whatever a backend produced (stream text, a serialized value, or
//! nothing at all) into the bounded, non-empty output string callers see.

use serde_json::Value;

/// Maximum output length in characters. Content past the cap is replaced
/// with [`TRUNCATION_MARKER`], never silently dropped.
pub const MAX_OUTPUT_CHARS: usize = 20_000;

/// Marker appended to truncated output.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Canned success message when a spawned program produced no output.
pub const NO_OUTPUT_MESSAGE: &str = "Code executed successfully (no output)";

/// Canned success message for interpreter backends with an empty capture
/// buffer and no final value.
pub const EXECUTED_MESSAGE: &str = "Code executed successfully";

/// Cap output at [`MAX_OUTPUT_CHARS`] characters, appending the truncation
/// marker past the cap. Output of exactly the cap length is left untouched.
pub fn truncate_output(output: String) -> String {
    match output.char_indices().nth(MAX_OUTPUT_CHARS) {
        Some((byte_idx, _)) => {
            let mut truncated = output[..byte_idx].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => output,
    }
}

/// Merge captured stderr and stdout into one success payload.
///
/// Error-channel text comes first (trimmed), then standard-channel text
/// (trimmed). If both are empty the fallback message is substituted so
/// callers always receive a non-empty output string on success.
pub fn merge_streams(stderr: &str, stdout: &str, fallback: &str) -> String {
    let mut output = String::new();
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    if !stderr.is_empty() {
        output.push_str(stderr);
        output.push('\n');
    }
    if !stdout.is_empty() {
        output.push_str(stdout);
    }
    let output = output.trim();
    if output.is_empty() {
        fallback.to_owned()
    } else {
        output.to_owned()
    }
}

/// Serialize a JSON value per the interpreter serialization policy: strings
/// pass through verbatim, everything else is JSON-serialized, and a
/// serialization crash falls back to the value's raw textual form.
pub fn stringify_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_below_cap_untouched() {
        let out = "hello".to_owned();
        assert_eq!(truncate_output(out.clone()), out);
    }

    #[test]
    fn truncate_exactly_at_cap_untouched() {
        let out = "x".repeat(MAX_OUTPUT_CHARS);
        let result = truncate_output(out.clone());
        assert_eq!(result.len(), MAX_OUTPUT_CHARS);
        assert!(!result.contains("[truncated]"));
    }

    #[test]
    fn truncate_past_cap_appends_marker() {
        let out = "x".repeat(25_000);
        let result = truncate_output(out);
        assert!(result.starts_with(&"x".repeat(MAX_OUTPUT_CHARS)));
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            result.chars().count(),
            MAX_OUTPUT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // Multi-byte characters must not be split mid-codepoint
        let out = "é".repeat(MAX_OUTPUT_CHARS + 100);
        let result = truncate_output(out);
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            result.chars().count(),
            MAX_OUTPUT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn merge_streams_stderr_first() {
        let result = merge_streams("warn\n", "value\n", NO_OUTPUT_MESSAGE);
        assert_eq!(result, "warn\nvalue");
    }

    #[test]
    fn merge_streams_empty_uses_fallback() {
        let result = merge_streams("", "  \n ", NO_OUTPUT_MESSAGE);
        assert_eq!(result, NO_OUTPUT_MESSAGE);
    }

    #[test]
    fn merge_streams_stdout_only() {
        let result = merge_streams("", "42\n", NO_OUTPUT_MESSAGE);
        assert_eq!(result, "42");
    }

    #[test]
    fn stringify_string_verbatim() {
        let value = Value::String("Hello, World!".to_owned());
        assert_eq!(stringify_json(&value), "Hello, World!");
    }

    #[test]
    fn stringify_number_as_json() {
        let value = serde_json::json!(4);
        assert_eq!(stringify_json(&value), "4");
    }

    #[test]
    fn stringify_array_as_json() {
        let value = serde_json::json!([2, 4, 6]);
        assert_eq!(stringify_json(&value), "[2,4,6]");
    }

    #[test]
    fn stringify_object_as_json() {
        let value = serde_json::json!({"sum": 30});
        assert_eq!(stringify_json(&value), "{\"sum\":30}");
    }
}
