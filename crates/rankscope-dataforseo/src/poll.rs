//! Polling for task-based endpoints.
//!
//! Task endpoints accept work through `task_post` and hand back results via
//! `task_get/{id}` once the provider has processed them. [`poll_for_results`]
//! drives that loop for a set of task ids: every round it fetches all pending
//! ids concurrently, classifies each task's status code, and sleeps with
//! capped exponential back-off before the next round. It never fails; an
//! incomplete set is reported through [`PollOutcome::pending`].

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

use crate::error::DataForSeoError;
use crate::types::{Task, STATUS_OK};

/// Task accepted but not yet processed.
const STATUS_CREATED: i64 = 20_100;
/// Task queued or in progress.
const STATUS_IN_QUEUE: [i64; 2] = [40_601, 40_602];
/// Codes after which polling the same id again is pointless.
const TERMINAL_FAILURES: [i64; 11] = [
    40_100, 40_200, 40_201, 40_202, 40_203, 40_204, 40_400, 40_401, 40_402, 40_403, 50_000,
];

const MAX_POLL_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Pending,
    Failed,
    Unknown,
}

#[must_use]
pub fn classify_status(code: i64) -> TaskStatus {
    if code == STATUS_OK {
        TaskStatus::Completed
    } else if code == STATUS_CREATED || STATUS_IN_QUEUE.contains(&code) {
        TaskStatus::Pending
    } else if TERMINAL_FAILURES.contains(&code) {
        TaskStatus::Failed
    } else {
        TaskStatus::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl PollPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: MAX_POLL_DELAY,
        }
    }

    /// Delay to wait after round `round` (1-based): the initial delay doubled
    /// once per completed round, capped at `max_delay`.
    #[must_use]
    pub fn delay_after(&self, round: u32) -> Duration {
        let factor = 1u32 << round.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug)]
pub struct PollOutcome<T> {
    /// Finished tasks in the order they completed.
    pub completed: Vec<Task<T>>,
    /// Ids that ended with a terminal failure code.
    pub failed: Vec<String>,
    /// Ids still unresolved when attempts ran out.
    pub pending: Vec<String>,
    pub attempts: u32,
}

impl<T> PollOutcome<T> {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Polls `task_ids` until every id is resolved or `policy.max_attempts`
/// rounds have run.
///
/// `fetch` performs a single `task_get` for one id. Transport errors and
/// unrecognised status codes keep the id pending for the next round.
pub async fn poll_for_results<T, F, Fut>(
    task_ids: &[String],
    policy: &PollPolicy,
    fetch: F,
) -> PollOutcome<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Task<T>, DataForSeoError>>,
{
    let mut pending: Vec<String> = task_ids.to_vec();
    let mut completed = Vec::new();
    let mut failed = Vec::new();
    let mut attempts = 0u32;

    tracing::debug!(tasks = task_ids.len(), "polling for task results");

    while attempts < policy.max_attempts && !pending.is_empty() {
        attempts += 1;
        tracing::debug!(
            attempt = attempts,
            max_attempts = policy.max_attempts,
            remaining = pending.len(),
            "polling round"
        );

        let responses = join_all(pending.iter().cloned().map(|id| {
            let fut = fetch(id.clone());
            async move { (id, fut.await) }
        }))
        .await;

        let mut still_pending = Vec::with_capacity(pending.len());
        for (id, response) in responses {
            match response {
                Ok(task) => match classify_status(task.status_code) {
                    TaskStatus::Completed => completed.push(task),
                    TaskStatus::Pending => still_pending.push(id),
                    TaskStatus::Failed => {
                        tracing::error!(
                            task_id = %id,
                            status_code = task.status_code,
                            status_message = %task.status_message,
                            "task failed"
                        );
                        failed.push(id);
                    }
                    TaskStatus::Unknown => {
                        tracing::warn!(
                            task_id = %id,
                            status_code = task.status_code,
                            status_message = %task.status_message,
                            "unexpected task status, will retry"
                        );
                        still_pending.push(id);
                    }
                },
                Err(err) => {
                    tracing::warn!(task_id = %id, error = %err, "error fetching task result");
                    still_pending.push(id);
                }
            }
        }
        pending = still_pending;

        if pending.is_empty() || attempts >= policy.max_attempts {
            break;
        }

        let delay = policy.delay_after(attempts);
        tracing::debug!(delay_ms = delay.as_millis(), "waiting before next polling round");
        tokio::time::sleep(delay).await;
    }

    if pending.is_empty() {
        tracing::info!(completed = completed.len(), failed = failed.len(), "all tasks resolved");
    } else {
        tracing::warn!(
            completed = completed.len(),
            failed = failed.len(),
            pending = pending.len(),
            attempts,
            "polling stopped with unresolved tasks"
        );
    }

    PollOutcome {
        completed,
        failed,
        pending,
        attempts,
    }
}
