// Task state module
//
// This module provides the TaskMonitor which wraps TaskStatus with thread-safe access
// using Arc<RwLock<T>> and emits lifecycle events for controllers.

use crate::models::{TaskOutcome, TaskPhase, TaskStatus};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::broadcast;

/// Lifecycle events emitted when a work thread changes phase
///
/// These let a controller react to the worker without polling, in addition to
/// its regular timer-driven [`poll_once()`](crate::task::WorkThread::poll_once).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskEvent {
    /// The background thread started running the work body
    Started,

    /// The worker raised show-results and is waiting
    PauseRequested { cycle: u64 },

    /// The worker woke from a pause and continues
    Resumed { cycle: u64 },

    /// The controller set the cancel signal
    CancelRequested,

    /// The work body returned
    Finished { outcome: TaskOutcome },
}

/// Thread-safe lifecycle tracker with event emission
///
/// Both the worker thread and the controller thread record transitions here:
/// - the worker records start, pauses, wake-ups and its outcome
/// - the controller records cancel requests
///
/// Transitions that the lifecycle state machine does not allow are logged and
/// dropped, so late or duplicated notifications cannot move a finished task.
pub struct TaskMonitor {
    /// The status protected by RwLock for thread-safe access
    status: Arc<RwLock<TaskStatus>>,

    /// Broadcast channel for lifecycle events
    event_tx: broadcast::Sender<TaskEvent>,
}

impl TaskMonitor {
    /// Create a new monitor for a task in the `Created` phase
    ///
    /// The broadcast channel buffers 100 events; slow subscribers observe a lag
    /// error rather than blocking the worker.
    pub fn new(task_name: impl Into<String>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            status: Arc::new(RwLock::new(TaskStatus::new(task_name))),
            event_tx,
        }
    }

    /// Get a clone of the current status
    pub fn snapshot(&self) -> TaskStatus {
        self.read(TaskStatus::clone)
    }

    /// Execute a function with read access to the status
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TaskStatus) -> R,
    {
        let status = self.status.read().unwrap_or_else(PoisonError::into_inner);
        f(&status)
    }

    pub fn phase(&self) -> TaskPhase {
        self.read(|s| s.phase)
    }

    /// Update the status and emit change events
    ///
    /// # Returns
    /// The events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<TaskEvent>
    where
        F: FnOnce(&mut TaskStatus),
    {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        let old_status = status.clone();

        update_fn(&mut status);

        let events = Self::detect_changes(&old_status, &status);
        for event in &events {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.event_tx.send(event.clone());
        }

        events
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_tx.subscribe()
    }

    fn detect_changes(old: &TaskStatus, new: &TaskStatus) -> Vec<TaskEvent> {
        let mut events = Vec::new();

        if old.cancel_requested != new.cancel_requested && new.cancel_requested {
            events.push(TaskEvent::CancelRequested);
        }

        if old.phase != new.phase {
            match (old.phase, new.phase) {
                (TaskPhase::Created, TaskPhase::Running) => events.push(TaskEvent::Started),
                (TaskPhase::Running, TaskPhase::Paused) => {
                    if let Some(cycle) = new.current_cycle {
                        events.push(TaskEvent::PauseRequested { cycle });
                    }
                }
                (TaskPhase::Paused, TaskPhase::Running) => {
                    if let Some(cycle) = old.current_cycle {
                        events.push(TaskEvent::Resumed { cycle });
                    }
                }
                _ => {}
            }

            if let Some(outcome) = new.outcome() {
                events.push(TaskEvent::Finished { outcome });
            }
        }

        events
    }

    /// Move to `next` if the lifecycle allows it, applying `f` in the same update
    fn transition<F>(&self, next: TaskPhase, f: F) -> Vec<TaskEvent>
    where
        F: FnOnce(&mut TaskStatus),
    {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if !status.phase.can_transition_to(next) {
            tracing::warn!(
                "Ignoring invalid task transition {} -> {} for {}",
                status.phase,
                next,
                status.task_name
            );
            return Vec::new();
        }

        let old_status = status.clone();
        status.phase = next;
        f(&mut status);

        let events = Self::detect_changes(&old_status, &status);
        for event in &events {
            let _ = self.event_tx.send(event.clone());
        }

        events
    }

    // Convenience methods for the lifecycle

    pub fn mark_started(&self) -> Vec<TaskEvent> {
        self.transition(TaskPhase::Running, |status| {
            status.started_at = Some(Instant::now());
        })
    }

    pub fn mark_paused(&self, cycle: u64) -> Vec<TaskEvent> {
        self.transition(TaskPhase::Paused, |status| {
            status.current_cycle = Some(cycle);
        })
    }

    pub fn mark_resumed(&self) -> Vec<TaskEvent> {
        self.transition(TaskPhase::Running, |status| {
            status.current_cycle = None;
            status.pause_cycles += 1;
        })
    }

    /// Record a cancel request. Only the first request emits an event.
    pub fn mark_cancel_requested(&self) -> Vec<TaskEvent> {
        self.update(|status| {
            status.cancel_requested = true;
        })
    }

    pub fn mark_finished(&self, outcome: TaskOutcome, fault: Option<String>) -> Vec<TaskEvent> {
        self.transition(outcome.into(), |status| {
            status.current_cycle = None;
            status.fault = fault;
            status.finished_at = Some(Instant::now());
        })
    }
}

impl Default for TaskMonitor {
    fn default() -> Self {
        Self::new("work-thread")
    }
}

// Make TaskMonitor cloneable for sharing across threads
impl Clone for TaskMonitor {
    fn clone(&self) -> Self {
        Self {
            status: Arc::clone(&self.status),
            event_tx: self.event_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_monitor() {
        let monitor = TaskMonitor::new("solver");
        let status = monitor.snapshot();

        assert_eq!(status.task_name, "solver");
        assert_eq!(status.phase, TaskPhase::Created);
        assert!(!status.cancel_requested);
    }

    #[test]
    fn test_full_pause_cycle_events() {
        let monitor = TaskMonitor::new("solver");

        assert_eq!(monitor.mark_started(), vec![TaskEvent::Started]);
        assert_eq!(
            monitor.mark_paused(1),
            vec![TaskEvent::PauseRequested { cycle: 1 }]
        );
        assert_eq!(monitor.mark_resumed(), vec![TaskEvent::Resumed { cycle: 1 }]);
        assert_eq!(
            monitor.mark_finished(TaskOutcome::Completed, None),
            vec![TaskEvent::Finished {
                outcome: TaskOutcome::Completed
            }]
        );

        let status = monitor.snapshot();
        assert_eq!(status.pause_cycles, 1);
        assert_eq!(status.outcome(), Some(TaskOutcome::Completed));
        assert!(status.finished_at.is_some());
    }

    #[test]
    fn test_cancel_requested_emits_once() {
        let monitor = TaskMonitor::new("solver");

        assert_eq!(
            monitor.mark_cancel_requested(),
            vec![TaskEvent::CancelRequested]
        );
        assert!(monitor.mark_cancel_requested().is_empty());
        assert!(monitor.read(|s| s.cancel_requested));
    }

    #[test]
    fn test_invalid_transition_is_ignored() {
        let monitor = TaskMonitor::new("solver");

        // Cannot pause before starting
        assert!(monitor.mark_paused(1).is_empty());
        assert_eq!(monitor.phase(), TaskPhase::Created);

        monitor.mark_started();
        monitor.mark_finished(TaskOutcome::Cancelled, None);

        // Terminal phases stay terminal
        assert!(monitor.mark_resumed().is_empty());
        assert_eq!(monitor.phase(), TaskPhase::Cancelled);
    }

    #[test]
    fn test_finish_from_pause_with_fault() {
        let monitor = TaskMonitor::new("solver");
        monitor.mark_started();
        monitor.mark_paused(1);

        let events = monitor.mark_finished(TaskOutcome::Faulted, Some("boom".to_string()));

        assert_eq!(
            events,
            vec![TaskEvent::Finished {
                outcome: TaskOutcome::Faulted
            }]
        );
        let status = monitor.snapshot();
        assert_eq!(status.fault.as_deref(), Some("boom"));
        assert_eq!(status.current_cycle, None);
    }

    #[test]
    fn test_subscribe_to_events() {
        let monitor = TaskMonitor::new("solver");
        let mut rx = monitor.subscribe();

        monitor.mark_started();

        let event = rx.try_recv();
        assert!(matches!(event, Ok(TaskEvent::Started)));
    }

    #[test]
    fn test_clone_shares_status() {
        let monitor1 = TaskMonitor::new("solver");
        let monitor2 = monitor1.clone();

        monitor1.mark_started();

        assert_eq!(monitor2.phase(), TaskPhase::Running);
    }
}
