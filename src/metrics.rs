// Handshake metrics module
//
// Lightweight counters for the controller/worker handshake of one work thread

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for one work thread.
///
/// Uses atomic operations so the worker and the controller can both record
/// without taking a lock. Shared as `Arc<TaskMetrics>` by
/// [`WorkThread`](crate::task::WorkThread).
#[derive(Debug)]
pub struct TaskMetrics {
    /// Number of controller polls (`timer_handler` invocations)
    pub polls: AtomicU64,

    /// Number of show-results requests raised by the worker
    pub pause_requests: AtomicU64,

    /// Number of pauses the controller released
    pub resumes: AtomicU64,

    /// Number of times the worker woke from a pause
    pub wakeups: AtomicU64,

    /// Number of cancel requests (including repeats)
    pub cancel_requests: AtomicU64,

    /// Number of polls that presented modal UI
    pub modal_presentations: AtomicU64,

    /// Total time the worker spent paused, in milliseconds
    pub total_paused_ms: AtomicU64,

    created_at: Instant,
}

impl TaskMetrics {
    pub fn new() -> Self {
        Self {
            polls: AtomicU64::new(0),
            pause_requests: AtomicU64::new(0),
            resumes: AtomicU64::new(0),
            wakeups: AtomicU64::new(0),
            cancel_requests: AtomicU64::new(0),
            modal_presentations: AtomicU64::new(0),
            total_paused_ms: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    pub fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pause_request(&self) {
        self.pause_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resume(&self) {
        self.resumes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker wake-up and how long it waited
    pub fn record_wakeup(&self, paused_for: Duration) {
        self.wakeups.fetch_add(1, Ordering::Relaxed);
        self.total_paused_ms
            .fetch_add(paused_for.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_cancel_request(&self) {
        self.cancel_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_modal_presentation(&self) {
        self.modal_presentations.fetch_add(1, Ordering::Relaxed);
    }

    /// Completed show-results → resume cycles
    pub fn pause_cycles(&self) -> u64 {
        self.resumes.load(Ordering::Relaxed)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Average pause length in milliseconds
    pub fn avg_pause_ms(&self) -> f64 {
        let total = self.total_paused_ms.load(Ordering::Relaxed);
        let count = self.wakeups.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self, task_name: &str) {
        tracing::info!("=== Work thread metrics: {} ===", task_name);
        tracing::info!("Age: {:.2}s", self.age().as_secs_f64());
        tracing::info!(
            "Polls: {}, modal presentations: {}",
            self.polls.load(Ordering::Relaxed),
            self.modal_presentations.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Pauses: {} requested, {} resumed, {} woke (avg pause {:.2}ms)",
            self.pause_requests.load(Ordering::Relaxed),
            self.resumes.load(Ordering::Relaxed),
            self.wakeups.load(Ordering::Relaxed),
            self.avg_pause_ms()
        );
        tracing::info!(
            "Cancel requests: {}",
            self.cancel_requests.load(Ordering::Relaxed)
        );
    }
}

impl Default for TaskMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = TaskMetrics::new();
        assert_eq!(metrics.polls.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.pause_cycles(), 0);
    }

    #[test]
    fn test_record_handshake() {
        let metrics = TaskMetrics::new();

        metrics.record_pause_request();
        metrics.record_resume();
        metrics.record_wakeup(Duration::from_millis(30));
        metrics.record_pause_request();
        metrics.record_resume();
        metrics.record_wakeup(Duration::from_millis(10));

        assert_eq!(metrics.pause_requests.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.pause_cycles(), 2);
        assert_eq!(metrics.total_paused_ms.load(Ordering::Relaxed), 40);
        assert_eq!(metrics.avg_pause_ms(), 20.0);
    }

    #[test]
    fn test_avg_pause_without_pauses() {
        let metrics = TaskMetrics::new();
        assert_eq!(metrics.avg_pause_ms(), 0.0);
    }

    #[test]
    fn test_age() {
        let metrics = TaskMetrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.age().as_millis() >= 10);
    }

    #[test]
    fn test_controller_counters() {
        let metrics = TaskMetrics::new();

        metrics.record_poll();
        metrics.record_poll();
        metrics.record_cancel_request();
        metrics.record_modal_presentation();

        assert_eq!(metrics.polls.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.cancel_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.modal_presentations.load(Ordering::Relaxed), 1);
    }
}
