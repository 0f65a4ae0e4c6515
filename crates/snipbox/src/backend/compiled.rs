//! Compiled-language backend
//!
//! Runs the full probe, stage, compile, locate, execute cycle for languages
//! that go through an external toolchain. Every run gets a fresh workspace;
//! spawned children carry `kill_on_drop` so losing the deadline race really
//! terminates them.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::backend::{EXECUTE_RESERVE, PROBE_TIMEOUT, WASM_CHAIN_BUDGET, wasm};
use crate::config::{ArtifactKind, Toolchain, ToolchainCandidate};
use crate::error::RunnerError;
use crate::normalize::{NO_OUTPUT_MESSAGE, merge_streams};
use crate::timeout::run_with_deadline;
use crate::workspace::Workspace;

/// Captured result of one spawned command.
#[derive(Debug)]
struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Spawn a command in `dir` and capture its output, killing the child if the
/// budget elapses first.
async fn run_command(
    args: &[String],
    dir: &Path,
    budget: Duration,
) -> Result<CommandOutput, RunnerError> {
    let program = args
        .first()
        .ok_or_else(|| RunnerError::RuntimeFault("empty command".to_owned()))?;

    let child = Command::new(program)
        .args(&args[1..])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(budget, child).await {
        Ok(result) => result?,
        Err(_) => return Err(RunnerError::Timeout),
    };

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Check whether a probe command runs successfully within the probe budget.
async fn probe_ok(args: &[String], dir: &Path) -> bool {
    matches!(run_command(args, dir, PROBE_TIMEOUT).await, Ok(out) if out.success)
}

/// A successful compile can still emit diagnostics on stderr. Text containing
/// "warning" or "note:" (case-insensitive) is advisory; anything else on a
/// non-empty stderr is treated as a compile failure.
fn is_fatal_diagnostics(stderr: &str) -> bool {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !lower.contains("warning") && !lower.contains("note:")
}

fn public_class_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"public\s+class\s+(\w+)").expect("valid regex"))
}

/// Extract the public class name from JVM source, defaulting to "Main".
fn extract_class_name(code: &str) -> String {
    public_class_pattern()
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| "Main".to_owned())
}

/// Pick the first candidate whose probe succeeds. The scan never falls
/// through past a healthy probe, even if that candidate's compile step later
/// fails.
async fn select_candidate<'a>(
    toolchain: &'a Toolchain,
    dir: &Path,
) -> Result<&'a ToolchainCandidate, RunnerError> {
    for candidate in &toolchain.candidates {
        if probe_ok(&candidate.probe, dir).await {
            return Ok(candidate);
        }
    }

    // No usable candidate; check whether an installed-but-wrong toolchain
    // deserves its tailored message instead of the generic hint
    if let Some(ref unsuitable) = toolchain.unsuitable
        && probe_ok(&unsuitable.probe, dir).await
    {
        return Err(RunnerError::ToolchainUnavailable(unsuitable.message.clone()));
    }

    Err(RunnerError::ToolchainUnavailable(
        toolchain.install_hint.clone(),
    ))
}

/// Find the compiled artifact, accepting a `.exe` sibling for native
/// binaries.
fn locate_artifact(
    toolchain: &Toolchain,
    workspace: &Workspace,
    output_name: &str,
    class_name: &str,
) -> Result<PathBuf, RunnerError> {
    let artifact = workspace.path(output_name);
    if artifact.exists() {
        return Ok(artifact);
    }

    if toolchain.artifact == ArtifactKind::Native {
        let exe = workspace.path(&format!("{output_name}.exe"));
        if exe.exists() {
            return Ok(exe);
        }
    }

    let mut message = match toolchain.artifact {
        ArtifactKind::Native => format!(
            "binary was not created. Expected: {} or {}",
            artifact.display(),
            workspace.path(&format!("{output_name}.exe")).display()
        ),
        ArtifactKind::Class => {
            format!("class file was not created. Expected class: {class_name}.class")
        }
        ArtifactKind::Wasm => "WASM file was not created.".to_owned(),
    };
    if let Some(ref note) = toolchain.artifact_missing_note {
        message.push(' ');
        message.push_str(note);
    }
    Err(RunnerError::ArtifactMissing(message))
}

/// Compile a snippet with the given toolchain and run the artifact.
///
/// The whole cycle is raced against `budget`; the compile step gets the
/// budget minus a fixed execution reserve.
#[instrument(skip(toolchain, code), fields(toolchain = %toolchain.name))]
pub async fn run(
    tag: &str,
    toolchain: &Toolchain,
    code: &str,
    budget: Duration,
) -> Result<String, RunnerError> {
    run_with_deadline(budget, run_inner(tag, toolchain, code, budget)).await
}

async fn run_inner(
    tag: &str,
    toolchain: &Toolchain,
    code: &str,
    budget: Duration,
) -> Result<String, RunnerError> {
    let cwd = std::env::temp_dir();
    let candidate = select_candidate(toolchain, &cwd).await?;

    if let Some(ref runtime_probe) = toolchain.runtime_probe
        && !probe_ok(runtime_probe, &cwd).await
    {
        return Err(RunnerError::ToolchainUnavailable(
            toolchain.install_hint.clone(),
        ));
    }

    let class_name = extract_class_name(code);
    let source_name = toolchain.source_name.replace("{class}", &class_name);
    let output_name = toolchain.output_name.replace("{class}", &class_name);

    let mut workspace = Workspace::create(&format!("{tag}-exec"))?;
    let result = compile_and_execute(
        toolchain,
        candidate,
        code,
        budget,
        &class_name,
        &source_name,
        &output_name,
        &workspace,
    )
    .await;
    workspace.cleanup();
    result
}

#[allow(clippy::too_many_arguments)]
async fn compile_and_execute(
    toolchain: &Toolchain,
    candidate: &ToolchainCandidate,
    code: &str,
    budget: Duration,
    class_name: &str,
    source_name: &str,
    output_name: &str,
    workspace: &Workspace,
) -> Result<String, RunnerError> {
    let source_path = workspace.write_source(source_name, code)?;
    debug!(source = %source_path.display(), "staged source file");

    let dir = workspace.dir().to_string_lossy().into_owned();
    let compile_cmd = Toolchain::expand_command(
        &candidate.compile,
        source_name,
        output_name,
        &dir,
        class_name,
    );

    let compile_budget = budget
        .checked_sub(EXECUTE_RESERVE)
        .unwrap_or(Duration::from_secs(1));
    let compile_out = run_command(&compile_cmd, workspace.dir(), compile_budget).await?;

    if !compile_out.success {
        let diagnostics = if compile_out.stderr.trim().is_empty() {
            compile_out.stdout.trim().to_owned()
        } else {
            compile_out.stderr.trim().to_owned()
        };
        let mut message = format!("{} compilation failed: {diagnostics}", toolchain.name);
        if let Some(ref note) = toolchain.compile_failure_note {
            message.push_str(". ");
            message.push_str(note);
        }
        return Err(RunnerError::CompileFailure(message));
    }

    if is_fatal_diagnostics(&compile_out.stderr) {
        return Err(RunnerError::CompileFailure(format!(
            "Compilation error: {}",
            compile_out.stderr.trim()
        )));
    }

    let artifact = locate_artifact(toolchain, workspace, output_name, class_name)?;
    debug!(artifact = %artifact.display(), "located artifact");

    if toolchain.artifact == ArtifactKind::Wasm {
        let module = std::fs::read(&artifact)?;
        return wasm::execute_module(&module, WASM_CHAIN_BUDGET).await;
    }

    let run_cmd = if toolchain.run.is_empty() {
        vec![artifact.to_string_lossy().into_owned()]
    } else {
        Toolchain::expand_command(&toolchain.run, source_name, output_name, &dir, class_name)
    };

    let run_out = run_command(&run_cmd, workspace.dir(), EXECUTE_RESERVE).await?;
    if !run_out.success {
        let diagnostics = if run_out.stderr.trim().is_empty() {
            run_out.stdout.trim().to_owned()
        } else {
            run_out.stderr.trim().to_owned()
        };
        return Err(RunnerError::RuntimeFault(format!(
            "{} execution failed: {diagnostics}",
            toolchain.name
        )));
    }

    Ok(merge_streams(
        &run_out.stderr,
        &run_out.stdout,
        NO_OUTPUT_MESSAGE,
    ))
}
