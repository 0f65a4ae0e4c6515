//! Python backend on rustpython
//!
//! Builds a fresh interpreter per call with the frozen stdlib and the native
//! stdlib modules registered. User code is wrapped so stdout and stderr are
//! redirected into a `StringIO` buffer, and a `sys.settrace` hook raises
//! `TimeoutError` once the deadline passes; that hook is the in-interpreter
//! step budget backing the outer wall-clock race.

use std::time::Duration;

use rustpython_vm::{Interpreter, Settings, compiler};
use tracing::instrument;

use crate::error::RunnerError;
use crate::normalize::EXECUTED_MESSAGE;
use crate::timeout::run_with_deadline;

const DEADLINE_MESSAGE: &str = "Execution timed out";

/// Wrap user code with stream redirection and the deadline trace hook.
///
/// The user snippet is indented into a `try` block; the `finally` arm always
/// restores the streams and snapshots the capture buffer, even when the
/// snippet raises.
fn wrap_code(user_code: &str, deadline_secs: f64) -> String {
    let indented: String = user_code
        .lines()
        .map(|line| format!("    {line}\n"))
        .collect();

    format!(
        r#"import sys, io, time
__snip_buf = io.StringIO()
__snip_old_out = sys.stdout
__snip_old_err = sys.stderr
__snip_deadline = time.time() + {deadline_secs}
def __snip_trace(frame, event, arg):
    if time.time() > __snip_deadline:
        raise TimeoutError({DEADLINE_MESSAGE:?})
    return __snip_trace
sys.stdout = __snip_buf
sys.stderr = __snip_buf
if getattr(sys, "settrace", None):
    sys.settrace(__snip_trace)
try:
{indented}
finally:
    sys.stdout = __snip_old_out
    sys.stderr = __snip_old_err
    if getattr(sys, "settrace", None):
        sys.settrace(None)
    __snip_captured = __snip_buf.getvalue()
"#
    )
}

fn evaluate(code: &str, deadline_secs: f64) -> Result<String, RunnerError> {
    let interpreter = Interpreter::with_init(Settings::default(), |vm| {
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
        vm.add_frozen(rustpython_pylib::FROZEN_STDLIB);
    });

    interpreter.enter(|vm| {
        let scope = vm.new_scope_with_builtins();
        let wrapped = wrap_code(code, deadline_secs);

        let code_obj = match vm.compile(&wrapped, compiler::Mode::Exec, "<snippet>".to_owned()) {
            Ok(obj) => obj,
            Err(err) => {
                let exc = vm.new_syntax_error(&err, Some(&wrapped));
                return Err(format_exception(vm, &exc));
            }
        };

        if let Err(exc) = vm.run_code_obj(code_obj, scope.clone()) {
            return Err(format_exception(vm, &exc));
        }

        let captured = scope
            .globals
            .get_item("__snip_captured", vm)
            .and_then(|obj| obj.str(vm))
            .map(|s| s.as_str().to_owned())
            .unwrap_or_default();

        if captured.trim().is_empty() {
            Ok(EXECUTED_MESSAGE.to_owned())
        } else {
            Ok(captured.trim_end().to_owned())
        }
    })
}

fn format_exception(
    vm: &rustpython_vm::VirtualMachine,
    exc: &rustpython_vm::builtins::PyBaseExceptionRef,
) -> RunnerError {
    let mut text = String::new();
    let _ = vm.write_exception(&mut text, exc);
    if text.contains(DEADLINE_MESSAGE) {
        RunnerError::Timeout
    } else {
        RunnerError::RuntimeFault(text.trim_end().to_owned())
    }
}

/// Evaluate a Python snippet within the given budget.
#[instrument(skip(code), fields(len = code.len()))]
pub async fn execute(code: &str, budget: Duration) -> Result<String, RunnerError> {
    let code = code.to_owned();
    let deadline_secs = budget.as_secs_f64();
    run_with_deadline(budget, async move {
        tokio::task::spawn_blocking(move || evaluate(&code, deadline_secs))
            .await
            .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?
    })
    .await
}
