//! Deadline racing for backend calls
//!
//! Every backend invocation is raced against a wall-clock budget. For
//! process-based backends the spawned child carries `kill_on_drop`, so losing
//! the race really terminates the external process. In-process evaluators are
//! only abandoned by the race; their own step budgets (loop-iteration limits,
//! instruction hooks, trace hooks) are the primary line of defense, and an
//! evaluator without one may keep consuming its blocking thread after the
//! caller has already received the timeout error.

use std::future::Future;
use std::time::Duration;

use crate::error::RunnerError;

/// Race a backend future against a deadline.
///
/// Returns [`RunnerError::Timeout`] if the budget elapses first; otherwise
/// passes the backend's own result through unchanged.
pub async fn run_with_deadline<F, T>(budget: Duration, fut: F) -> Result<T, RunnerError>
where
    F: Future<Output = Result<T, RunnerError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(RunnerError::Timeout),
    }
}
