// Timer-driven controller loop
//
// Stands in for a UI toolkit's timer: every tick polls the work thread once and
// never blocks on the worker itself.

use crate::models::TaskOutcome;
use crate::task::{PollResult, WorkThread, WorkerTask};
use anyhow::{Result, bail};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Poll `work_thread` every `poll_interval` until its background thread exits.
///
/// With `cancel_after`, the loop requests cancellation once that many pause
/// cycles have completed (only for tasks that support it).
///
/// # Errors
///
/// Fails if the work thread was never started, since it would never finish.
pub async fn drive<T: WorkerTask>(
    work_thread: &WorkThread<T>,
    controller: &mut T::Controller,
    poll_interval: Duration,
    cancel_after: Option<u64>,
) -> Result<TaskOutcome> {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cancel_sent = false;

    loop {
        ticker.tick().await;

        let result = work_thread.poll_once(controller);
        if result.restack() {
            tracing::debug!("Modal UI shown for {}, restacking", work_thread.name());
        }

        match result {
            PollResult::NotStarted => bail!("Work thread {} was never started", work_thread.name()),
            PollResult::Finished { outcome, .. } => return Ok(outcome),
            PollResult::Running { .. } | PollResult::AwaitingResume { .. } => {}
        }

        let limit_reached = cancel_after
            .is_some_and(|limit| work_thread.metrics().pause_cycles() >= limit);

        if limit_reached && !cancel_sent && work_thread.supports_cancel_request() {
            tracing::info!("Pause limit reached, cancelling {}", work_thread.name());
            work_thread.cancel_worker_task();
            cancel_sent = true;
        }
    }
}
