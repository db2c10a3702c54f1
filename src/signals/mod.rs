// Handshake signals between a worker thread and its controller
//
// The show-results, resume and cancel signals live together behind one mutex so
// every transition is ordered by the same lock. The worker blocks on the condvar
// only while paused, and any cancel wakes it.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Why a paused worker woke up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The controller released the pause
    Resumed,
    /// Cancellation was requested before or during the pause
    Cancelled,
}

/// Point-in-time view of the three signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSnapshot {
    pub show_results: bool,
    pub resume: bool,
    pub cancelled: bool,
    /// Number of pause requests that have been resumed by the controller
    pub completed_cycles: u64,
}

#[derive(Debug, Default)]
struct SignalState {
    show_results: bool,
    resume: bool,
    cancelled: bool,
    requested_cycles: u64,
    completed_cycles: u64,
}

/// Pause/resume/cancel state machine shared by the worker and the controller.
///
/// Worker side:
/// - [`request_pause()`](Self::request_pause) raises show-results
/// - [`wait_for_resume_or_cancel()`](Self::wait_for_resume_or_cancel) blocks until
///   the controller resumes or anyone cancels
///
/// Controller side:
/// - [`show_results_requested()`](Self::show_results_requested) is a non-blocking check
/// - [`resume()`](Self::resume) sets resume and clears show-results in one step
/// - [`cancel()`](Self::cancel) sets the terminal cancel flag
///
/// The cancel flag is monotonic: nothing clears it once set.
#[derive(Debug, Default)]
pub struct Handshake {
    state: Mutex<SignalState>,
    cvar: Condvar,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        // The state is plain flags, so a panic while holding the lock cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raise show-results for the controller.
    ///
    /// Clears any stale resume so the following wait only returns for a resume
    /// issued against this request. Returns the cycle number of the request, or
    /// `None` if cancellation is already set (no pause is opened then).
    pub fn request_pause(&self) -> Option<u64> {
        let mut state = self.lock();
        if state.cancelled {
            return None;
        }
        state.resume = false;
        state.show_results = true;
        state.requested_cycles += 1;
        Some(state.requested_cycles)
    }

    /// Block until the controller resumes or cancellation is requested.
    ///
    /// `wait_cycle` bounds each individual condvar wait; the flags are re-checked
    /// after every wake, so a missed notification costs at most one cycle. Resume
    /// is consumed (cleared) before returning so the handshake can repeat.
    pub fn wait_for_resume_or_cancel(&self, wait_cycle: Duration) -> Wake {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return Wake::Cancelled;
            }
            if state.resume {
                state.resume = false;
                return Wake::Resumed;
            }
            let (guard, _timeout) = self
                .cvar
                .wait_timeout(state, wait_cycle)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// Release a pending pause.
    ///
    /// Returns false if show-results was not set or cancellation is already
    /// set, in which case nothing changes. A cancelled pause only ends through
    /// the cancel wake.
    pub fn resume(&self) -> bool {
        let mut state = self.lock();
        if !state.show_results || state.cancelled {
            return false;
        }
        state.show_results = false;
        state.resume = true;
        state.completed_cycles += 1;
        drop(state);
        self.cvar.notify_all();
        true
    }

    /// Set the cancel flag and wake a paused worker.
    ///
    /// Returns true only for the call that actually set the flag.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        let first = !state.cancelled;
        state.cancelled = true;
        drop(state);
        self.cvar.notify_all();
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    pub fn show_results_requested(&self) -> bool {
        self.lock().show_results
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        let state = self.lock();
        SignalSnapshot {
            show_results: state.show_results,
            resume: state.resume,
            cancelled: state.cancelled,
            completed_cycles: state.completed_cycles,
        }
    }
}
