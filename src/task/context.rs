// Views handed to a task: WorkContext on the worker thread, PollWindow on the controller

use super::error::WorkError;
use crate::metrics::TaskMetrics;
use crate::signals::{Handshake, Wake};
use crate::state::TaskMonitor;
use crate::subject::SharedSubject;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a work body can reach from the background thread.
///
/// Cancellation checkpoints and pauses go through here; both return
/// [`WorkError::Cancelled`] once the controller has cancelled, so a body exits
/// with `?`:
///
/// ```ignore
/// for step in steps {
///     work.checkpoint()?;
///     work.subject().update(|board| board.apply(step));
///     if step.is_interesting() {
///         work.pause_for_results()?;
///     }
/// }
/// ```
pub struct WorkContext<D, S> {
    pub(crate) context: Arc<D>,
    pub(crate) subject: SharedSubject<S>,
    pub(crate) handshake: Arc<Handshake>,
    pub(crate) monitor: TaskMonitor,
    pub(crate) metrics: Arc<TaskMetrics>,
    pub(crate) wait_cycle: Duration,
}

impl<D, S> WorkContext<D, S> {
    /// The domain object (solver, strategy) shared with the controller
    pub fn context(&self) -> &D {
        &self.context
    }

    pub fn subject(&self) -> &SharedSubject<S> {
        &self.subject
    }

    pub fn is_cancelled(&self) -> bool {
        self.handshake.is_cancelled()
    }

    /// Cancellation checkpoint
    pub fn checkpoint(&self) -> Result<(), WorkError> {
        if self.handshake.is_cancelled() {
            tracing::debug!("Cancellation observed at checkpoint");
            return Err(WorkError::Cancelled);
        }
        Ok(())
    }

    /// Ask the controller to show the current subject and wait until it resumes.
    ///
    /// The wait also ends when cancellation is requested, so a controller that
    /// cancels instead of resuming never leaves the worker parked.
    pub fn pause_for_results(&self) -> Result<(), WorkError> {
        let Some(cycle) = self.handshake.request_pause() else {
            return Err(WorkError::Cancelled);
        };
        self.metrics.record_pause_request();
        self.monitor.mark_paused(cycle);
        tracing::debug!(cycle, "Worker paused for results");

        let paused_at = Instant::now();
        let wake = self.handshake.wait_for_resume_or_cancel(self.wait_cycle);
        self.metrics.record_wakeup(paused_at.elapsed());

        match wake {
            Wake::Resumed => {
                self.monitor.mark_resumed();
                tracing::debug!(cycle, "Worker resumed");
                Ok(())
            }
            Wake::Cancelled => {
                tracing::debug!(cycle, "Worker cancelled while paused");
                Err(WorkError::Cancelled)
            }
        }
    }
}

/// Controller-side view of a work thread during one timer poll.
///
/// Only valid for the duration of [`WorkerTask::on_poll`](super::WorkerTask::on_poll).
pub struct PollWindow<'a, S> {
    pub(crate) subject: &'a SharedSubject<S>,
    pub(crate) handshake: &'a Handshake,
    pub(crate) metrics: &'a TaskMetrics,
}

impl<'a, S> PollWindow<'a, S> {
    /// True while the worker is waiting for the controller to show results
    pub fn show_results_requested(&self) -> bool {
        self.handshake.show_results_requested()
    }

    pub fn is_cancelled(&self) -> bool {
        self.handshake.is_cancelled()
    }

    pub fn subject(&self) -> &'a SharedSubject<S> {
        self.subject
    }

    /// Release the worker: sets resume and clears show-results.
    ///
    /// Returns false if no pause was pending or the task was cancelled.
    pub fn resume(&self) -> bool {
        let resumed = self.handshake.resume();
        if resumed {
            self.metrics.record_resume();
        }
        resumed
    }

    /// If a pause is pending, read the subject with `present` and then resume.
    ///
    /// Returns `None` when the worker has not asked to show results, or when
    /// the task has been cancelled and the pending pause will never resume.
    pub fn present_and_resume<F, R>(&self, present: F) -> Option<R>
    where
        F: FnOnce(&S) -> R,
    {
        if !self.show_results_requested() || self.is_cancelled() {
            return None;
        }
        let presented = self.subject.read(present);
        self.resume();
        Some(presented)
    }
}
