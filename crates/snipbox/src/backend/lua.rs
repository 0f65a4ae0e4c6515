//! Lua backend on mlua
//!
//! A fresh `Lua` state per call. `print` is overridden to append tab-joined
//! arguments to a shared capture buffer, and an instruction-count hook
//! enforces the deadline from inside the interpreter so tight loops cannot
//! outlive the budget on a blocking thread.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mlua::{Lua, MultiValue, Value, VmState};
use tracing::instrument;

use crate::error::RunnerError;
use crate::normalize::EXECUTED_MESSAGE;
use crate::timeout::run_with_deadline;

const HOOK_INSTRUCTION_INTERVAL: u32 = 50_000;
const BUDGET_EXCEEDED: &str = "execution budget exceeded";

fn display_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_owned(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy().to_string(),
        other => format!("{}", other.type_name()),
    }
}

/// Serialize one returned value: strings verbatim, everything else as JSON,
/// unserializable values through the textual fallback.
fn serialize_value(value: &Value) -> String {
    if let Value::String(s) = value {
        return s.to_string_lossy().to_string();
    }
    serde_json::to_string(value).unwrap_or_else(|_| display_value(value))
}

fn map_lua_error(err: mlua::Error) -> RunnerError {
    let message = err.to_string();
    if message.contains(BUDGET_EXCEEDED) {
        RunnerError::Timeout
    } else {
        RunnerError::RuntimeFault(message)
    }
}

fn evaluate(code: &str, budget: Duration) -> Result<String, RunnerError> {
    let lua = Lua::new();
    let captured: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&captured);
    let print = lua
        .create_function(move |_, args: MultiValue| {
            let line: Vec<String> = args.iter().map(display_value).collect();
            if let Ok(mut lines) = sink.lock() {
                lines.push(line.join("\t"));
            }
            Ok(())
        })
        .map_err(map_lua_error)?;
    lua.globals().set("print", print).map_err(map_lua_error)?;

    let deadline = Instant::now() + budget;
    lua.set_hook(
        mlua::HookTriggers::new().every_nth_instruction(HOOK_INSTRUCTION_INTERVAL),
        move |_, _| {
            if Instant::now() > deadline {
                Err(mlua::Error::RuntimeError(BUDGET_EXCEEDED.to_owned()))
            } else {
                Ok(VmState::Continue)
            }
        },
    );

    // Chunk::eval tries "return <chunk>" first, so bare expressions yield
    // their value and statement blocks still run
    let values: MultiValue = lua.load(code).eval().map_err(map_lua_error)?;

    let lines = captured
        .lock()
        .map(|lines| lines.join("\n"))
        .unwrap_or_default();
    if !lines.is_empty() {
        return Ok(lines);
    }

    if !values.is_empty() {
        let parts: Vec<String> = values.iter().map(serialize_value).collect();
        return Ok(parts.join("\t"));
    }

    Ok(EXECUTED_MESSAGE.to_owned())
}

/// Evaluate a Lua snippet within the given budget.
#[instrument(skip(code), fields(len = code.len()))]
pub async fn execute(code: &str, budget: Duration) -> Result<String, RunnerError> {
    let code = code.to_owned();
    run_with_deadline(budget, async move {
        tokio::task::spawn_blocking(move || evaluate(&code, budget))
            .await
            .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bare_expression_yields_value() {
        let result = execute("1 + 2", Duration::from_secs(3)).await.unwrap();
        assert_eq!(result, "3");
    }

    #[tokio::test]
    async fn explicit_return_yields_value() {
        let result = execute("return 2 * 21", Duration::from_secs(3)).await.unwrap();
        assert_eq!(result, "42");
    }

    #[tokio::test]
    async fn print_args_are_tab_joined() {
        let result = execute("print('a', 1, true)", Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(result, "a\t1\ttrue");
    }

    #[tokio::test]
    async fn print_lines_are_newline_joined() {
        let code = "for i = 1, 3 do print(i) end";
        let result = execute(code, Duration::from_secs(3)).await.unwrap();
        assert_eq!(result, "1\n2\n3");
    }

    #[tokio::test]
    async fn print_wins_over_return_values() {
        let result = execute("print('seen') return 7", Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(result, "seen");
    }

    #[tokio::test]
    async fn string_return_is_verbatim() {
        let result = execute("return 'hello'", Duration::from_secs(3)).await.unwrap();
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn table_return_is_json() {
        let result = execute("return {2, 4, 6}", Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(result, "[2,4,6]");
    }

    #[tokio::test]
    async fn silent_block_reports_canned_success() {
        let result = execute("local x = 1", Duration::from_secs(3)).await.unwrap();
        assert_eq!(result, EXECUTED_MESSAGE);
    }

    #[tokio::test]
    async fn runtime_error_is_fault() {
        let result = execute("error('bang')", Duration::from_secs(3)).await;
        match result {
            Err(RunnerError::RuntimeFault(msg)) => assert!(msg.contains("bang")),
            other => panic!("expected runtime fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn infinite_loop_hits_instruction_budget() {
        let start = std::time::Instant::now();
        let result = execute("while true do end", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(RunnerError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
