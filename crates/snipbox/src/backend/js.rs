//! JavaScript backend on the boa engine
//!
//! Evaluates snippets in a fresh context per call. A `print` shim collects
//! console-style output into an in-context array read back after evaluation;
//! when nothing was printed, the completion value itself becomes the output.
//!
//! Runaway scripts are stopped by boa's runtime limits (loop iterations and
//! recursion depth), which surface here as a timeout. The outer deadline
//! race is the second line of defense.

use std::time::Duration;

use boa_engine::{Context, JsError, JsValue, Source};
use tracing::instrument;

use crate::error::RunnerError;
use crate::normalize::{EXECUTED_MESSAGE, stringify_json};
use crate::timeout::run_with_deadline;

const LOOP_ITERATION_LIMIT: u64 = 10_000_000;
const RECURSION_LIMIT: usize = 1_000;

const PRINT_SHIM: &str = r#"
const __captured = [];
globalThis.print = function(...args) {
    __captured.push(args.map(String).join(' '));
};
globalThis.console = {
    log: globalThis.print,
    error: globalThis.print,
    warn: globalThis.print,
    info: globalThis.print,
};
"#;

fn map_js_error(err: JsError) -> RunnerError {
    let message = err.to_string();
    // Runtime-limit violations are the engine's step budget firing
    if message.to_lowercase().contains("limit") {
        RunnerError::Timeout
    } else {
        RunnerError::RuntimeFault(message)
    }
}

fn evaluate(code: &str) -> Result<String, RunnerError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(LOOP_ITERATION_LIMIT);
    context.runtime_limits_mut().set_recursion_limit(RECURSION_LIMIT);

    context
        .eval(Source::from_bytes(PRINT_SHIM))
        .map_err(map_js_error)?;

    let completion = context
        .eval(Source::from_bytes(code))
        .map_err(map_js_error)?;

    let captured = context
        .eval(Source::from_bytes("__captured.join('\\n')"))
        .map_err(map_js_error)?;
    if let Some(text) = captured.as_string() {
        let text = text.to_std_string_escaped();
        if !text.is_empty() {
            return Ok(text);
        }
    }

    Ok(serialize_completion(&completion, &mut context))
}

fn serialize_completion(value: &JsValue, context: &mut Context) -> String {
    if value.is_undefined() || value.is_null() {
        return EXECUTED_MESSAGE.to_owned();
    }
    if let Some(s) = value.as_string() {
        return s.to_std_string_escaped();
    }
    match value.to_json(context) {
        Ok(json) => stringify_json(&json),
        Err(_) => value.display().to_string(),
    }
}

/// Evaluate a JavaScript snippet within the given budget.
#[instrument(skip(code), fields(len = code.len()))]
pub async fn execute(code: &str, budget: Duration) -> Result<String, RunnerError> {
    let code = code.to_owned();
    run_with_deadline(budget, async move {
        tokio::task::spawn_blocking(move || evaluate(&code))
            .await
            .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?
    })
    .await
}
