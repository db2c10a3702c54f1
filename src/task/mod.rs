//! Work threads - long-running computation off the controller thread.
//!
//! A concrete task implements [`WorkerTask`]; the controller wraps it in a
//! [`WorkThread`] and drives it from its own timer:
//!
//! ```ignore
//! let mut thread = WorkThread::new(MySolver::default(), Arc::new(strategy), board.clone());
//! thread.start()?;
//!
//! // On every controller timer tick:
//! match thread.poll_once(&mut view) {
//!     PollResult::Finished { outcome, .. } => handle_outcome(outcome),
//!     _ => {}
//! }
//! ```
//!
//! # Handshake
//!
//! The worker pauses with [`WorkContext::pause_for_results`], which raises
//! show-results and blocks until the controller calls [`PollWindow::resume`] from
//! [`WorkerTask::on_poll`]. Cancellation wakes a paused worker as well, so
//! the controller never has to resume a task it is cancelling.
//!
//! Cancellation is cooperative: the work body observes it at
//! [`WorkContext::checkpoint`] and inside pauses. A task that never checks
//! must keep the default [`WorkerTask::supports_cancel`] of `false`.

pub mod context;
pub mod error;
pub mod thread;

pub use context::{PollWindow, WorkContext};
pub use error::{TaskError, WorkError};
pub use thread::{PollResult, WorkThread};

/// A unit of background work plugged into the [`WorkThread`] lifecycle.
pub trait WorkerTask: Send + Sync + 'static {
    /// Domain object the work uses (solver, strategy); shared with the controller
    type Context: Send + Sync + 'static;

    /// Object being worked on; shared with the controller
    type Subject: Send + Sync + 'static;

    /// Whatever the controller hands to [`on_poll`](Self::on_poll) to display results
    type Controller: ?Sized;

    /// Name used in logs and for the monitor
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// The work body, run once on the background thread.
    ///
    /// Returning `Err(WorkError::Cancelled)` ends the task as cancelled,
    /// `Err(WorkError::Failed(_))` as faulted. Panics are caught at the thread
    /// entry point and also count as faulted.
    fn run_work(&self, work: &WorkContext<Self::Context, Self::Subject>) -> Result<(), WorkError>;

    /// Whether the work body checks for cancellation
    fn supports_cancel(&self) -> bool {
        false
    }

    /// Called on every controller timer tick, on the controller thread.
    ///
    /// Overrides typically check [`PollWindow::show_results_requested`], display
    /// the subject through `controller`, then [`PollWindow::resume`]. Returns true
    /// only if modal UI was shown that the controller must now restack.
    fn on_poll(
        &self,
        window: &PollWindow<'_, Self::Subject>,
        controller: &mut Self::Controller,
    ) -> bool {
        let _ = (window, controller);
        false
    }
}
