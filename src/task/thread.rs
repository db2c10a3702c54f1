// WorkThread - owns the background thread of one WorkerTask

use super::context::{PollWindow, WorkContext};
use super::error::{TaskError, WorkError};
use super::WorkerTask;
use crate::metrics::TaskMetrics;
use crate::models::{PollSettings, TaskOutcome, TaskPhase, TaskStatus};
use crate::signals::{Handshake, SignalSnapshot};
use crate::state::{TaskEvent, TaskMonitor};
use crate::subject::SharedSubject;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::broadcast;

/// What one controller timer tick observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// `start()` has not been called yet
    NotStarted,

    /// The worker is computing
    Running { restack: bool },

    /// The worker is waiting for the controller to show results and resume
    AwaitingResume { restack: bool },

    /// The background thread has exited
    Finished { outcome: TaskOutcome, restack: bool },
}

impl PollResult {
    /// Whether the poll presented modal UI that the controller must restack
    pub fn restack(&self) -> bool {
        match *self {
            Self::NotStarted => false,
            Self::Running { restack }
            | Self::AwaitingResume { restack }
            | Self::Finished { restack, .. } => restack,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Lifecycle handle for one background thread running a [`WorkerTask`].
///
/// Owned by the controller. The thread is prepared at construction, spawned by
/// [`start()`](Self::start) and never joined: it does not hold up process exit,
/// and dropping the handle only requests cancellation before detaching. Work in
/// flight at shutdown is abandoned.
pub struct WorkThread<T: WorkerTask> {
    task: Arc<T>,
    context: Arc<T::Context>,
    subject: SharedSubject<T::Subject>,
    handshake: Arc<Handshake>,
    monitor: TaskMonitor,
    metrics: Arc<TaskMetrics>,
    wait_cycle: Duration,

    /// Consumed by `start()`; `None` afterwards
    builder: Option<thread::Builder>,
    handle: Option<JoinHandle<()>>,
}

impl<T: WorkerTask> WorkThread<T> {
    /// Create a work thread with default poll settings
    pub fn new(task: T, context: Arc<T::Context>, subject: SharedSubject<T::Subject>) -> Self {
        Self::with_settings(task, context, subject, &PollSettings::default())
    }

    /// Create a work thread using the given thread name and wait cycle
    pub fn with_settings(
        task: T,
        context: Arc<T::Context>,
        subject: SharedSubject<T::Subject>,
        settings: &PollSettings,
    ) -> Self {
        let monitor = TaskMonitor::new(task.name());
        let builder = thread::Builder::new().name(settings.thread_name.clone());

        tracing::debug!(
            "Prepared work thread {} (thread={}, wait_cycle={:?})",
            task.name(),
            settings.thread_name,
            settings.wait_cycle()
        );

        Self {
            task: Arc::new(task),
            context,
            subject,
            handshake: Arc::new(Handshake::new()),
            monitor,
            metrics: Arc::new(TaskMetrics::new()),
            wait_cycle: settings.wait_cycle(),
            builder: Some(builder),
            handle: None,
        }
    }

    /// Spawn the background thread running [`WorkerTask::run_work`].
    ///
    /// # Errors
    ///
    /// - [`TaskError::AlreadyStarted`] if called more than once
    /// - [`TaskError::Spawn`] if the OS refused to create the thread
    pub fn start(&mut self) -> Result<(), TaskError> {
        let name = self.task.name().to_string();

        let Some(builder) = self.builder.take() else {
            tracing::error!("start() called twice on work thread {}", name);
            return Err(TaskError::AlreadyStarted(name));
        };

        let work = WorkContext {
            context: Arc::clone(&self.context),
            subject: self.subject.clone(),
            handshake: Arc::clone(&self.handshake),
            monitor: self.monitor.clone(),
            metrics: Arc::clone(&self.metrics),
            wait_cycle: self.wait_cycle,
        };
        let task = Arc::clone(&self.task);

        // Running from the moment start() returns, even if the thread is not scheduled yet
        self.monitor.mark_started();

        match builder.spawn(move || run_to_completion(task.as_ref(), &work)) {
            Ok(handle) => {
                tracing::info!("Started work thread {}", name);
                self.handle = Some(handle);
                Ok(())
            }
            Err(source) => {
                tracing::error!("Failed to spawn work thread {}: {}", name, source);
                self.monitor
                    .mark_finished(TaskOutcome::Faulted, Some(source.to_string()));
                Err(TaskError::Spawn { name, source })
            }
        }
    }

    /// Non-blocking liveness check: true from `start()` until the work body returns
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Request cooperative cancellation. Does not wait for the worker to stop.
    pub fn cancel_worker_task(&self) {
        self.metrics.record_cancel_request();

        if !self.task.supports_cancel() {
            tracing::warn!(
                "Cancel requested for {}, which does not check for cancellation",
                self.task.name()
            );
        }

        if self.handshake.cancel() {
            self.monitor.mark_cancel_requested();
            tracing::info!("Cancellation requested for {}", self.task.name());
        }
    }

    pub fn supports_cancel_request(&self) -> bool {
        self.task.supports_cancel()
    }

    /// Give the task its timer callback on the controller thread.
    ///
    /// Returns true if the task presented modal UI that the controller must now
    /// restack.
    pub fn timer_handler(&self, controller: &mut T::Controller) -> bool {
        self.metrics.record_poll();

        let window = PollWindow {
            subject: &self.subject,
            handshake: &self.handshake,
            metrics: &self.metrics,
        };
        let presented_modal = self.task.on_poll(&window, controller);

        if presented_modal {
            self.metrics.record_modal_presentation();
        }
        presented_modal
    }

    /// One controller timer tick: run [`timer_handler`](Self::timer_handler), then
    /// report where the worker stands.
    pub fn poll_once(&self, controller: &mut T::Controller) -> PollResult {
        if self.handle.is_none() {
            return PollResult::NotStarted;
        }

        let restack = self.timer_handler(controller);

        if !self.is_alive() {
            // The thread records its outcome before exiting, so this is always set
            let outcome = self.outcome().unwrap_or(TaskOutcome::Faulted);
            return PollResult::Finished { outcome, restack };
        }

        if self.handshake.show_results_requested() {
            PollResult::AwaitingResume { restack }
        } else {
            PollResult::Running { restack }
        }
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn context(&self) -> &Arc<T::Context> {
        &self.context
    }

    pub fn subject(&self) -> &SharedSubject<T::Subject> {
        &self.subject
    }

    pub fn phase(&self) -> TaskPhase {
        self.monitor.phase()
    }

    /// Terminal outcome, once the work body has returned
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.monitor.read(TaskStatus::outcome)
    }

    pub fn status(&self) -> TaskStatus {
        self.monitor.snapshot()
    }

    pub fn signals(&self) -> SignalSnapshot {
        self.handshake.snapshot()
    }

    pub fn metrics(&self) -> &Arc<TaskMetrics> {
        &self.metrics
    }

    /// Subscribe to lifecycle events of this work thread
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.monitor.subscribe()
    }
}

impl<T: WorkerTask> Drop for WorkThread<T> {
    fn drop(&mut self) {
        if self.is_alive() && self.handshake.cancel() {
            self.monitor.mark_cancel_requested();
            tracing::debug!(
                "Work thread {} dropped while running - cancelled and detached",
                self.task.name()
            );
        }
    }
}

/// Thread entry point: run the body and record how it ended
fn run_to_completion<T: WorkerTask>(task: &T, work: &WorkContext<T::Context, T::Subject>) {
    let name = task.name();
    tracing::debug!("Work thread {} running", name);

    let result = panic::catch_unwind(AssertUnwindSafe(|| task.run_work(work)));

    let (outcome, fault) = match result {
        Ok(Ok(())) => (TaskOutcome::Completed, None),
        Ok(Err(WorkError::Cancelled)) => (TaskOutcome::Cancelled, None),
        Ok(Err(WorkError::Failed(err))) => {
            tracing::error!("Work thread {} failed: {:#}", name, err);
            (TaskOutcome::Faulted, Some(format!("{err:#}")))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Work thread {} panicked: {}", name, message);
            (TaskOutcome::Faulted, Some(message))
        }
    };

    work.monitor.mark_finished(outcome, fault);
    tracing::info!("Work thread {} finished: {:?}", name, outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Instant;

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        done()
    }

    /// Blocks until the test sends on the gate, then finishes
    struct Gated {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl WorkerTask for Gated {
        type Context = ();
        type Subject = u32;
        type Controller = ();

        fn run_work(&self, work: &WorkContext<(), u32>) -> Result<(), WorkError> {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv();
            work.subject().update(|n| *n += 1);
            Ok(())
        }
    }

    fn gated() -> (WorkThread<Gated>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let task = Gated {
            gate: Mutex::new(rx),
        };
        (WorkThread::new(task, Arc::new(()), SharedSubject::new(0)), tx)
    }

    struct Failing;

    impl WorkerTask for Failing {
        type Context = ();
        type Subject = ();
        type Controller = ();

        fn run_work(&self, _work: &WorkContext<(), ()>) -> Result<(), WorkError> {
            Err(anyhow::anyhow!("no solution exists").into())
        }
    }

    struct Panicking;

    impl WorkerTask for Panicking {
        type Context = ();
        type Subject = ();
        type Controller = ();

        fn run_work(&self, _work: &WorkContext<(), ()>) -> Result<(), WorkError> {
            panic!("solver invariant broken");
        }
    }

    #[test]
    fn test_alive_only_between_start_and_return() {
        let (mut work_thread, gate) = gated();
        assert!(!work_thread.is_alive());
        assert_eq!(work_thread.phase(), TaskPhase::Created);

        work_thread.start().unwrap();
        assert!(work_thread.is_alive());
        assert_eq!(work_thread.phase(), TaskPhase::Running);

        gate.send(()).unwrap();
        assert!(wait_until(|| !work_thread.is_alive()));
        assert_eq!(work_thread.outcome(), Some(TaskOutcome::Completed));
        assert_eq!(work_thread.subject().snapshot(), 1);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (mut work_thread, gate) = gated();
        work_thread.start().unwrap();

        let err = work_thread.start().unwrap_err();
        assert!(matches!(err, TaskError::AlreadyStarted(_)));

        gate.send(()).unwrap();
        assert!(wait_until(|| !work_thread.is_alive()));
    }

    #[test]
    fn test_poll_before_start() {
        let (work_thread, _gate) = gated();
        assert_eq!(work_thread.poll_once(&mut ()), PollResult::NotStarted);
    }

    #[test]
    fn test_default_hooks() {
        let (work_thread, _gate) = gated();
        assert!(!work_thread.supports_cancel_request());
        assert!(!work_thread.timer_handler(&mut ()));
        assert_eq!(work_thread.name(), "Gated");
    }

    #[test]
    fn test_failed_body_is_faulted() {
        let mut work_thread = WorkThread::new(Failing, Arc::new(()), SharedSubject::new(()));
        work_thread.start().unwrap();

        assert!(wait_until(|| !work_thread.is_alive()));
        assert_eq!(work_thread.outcome(), Some(TaskOutcome::Faulted));
        assert_eq!(
            work_thread.status().fault.as_deref(),
            Some("no solution exists")
        );
    }

    #[test]
    fn test_panicking_body_is_faulted() {
        let mut work_thread = WorkThread::new(Panicking, Arc::new(()), SharedSubject::new(()));
        work_thread.start().unwrap();

        assert!(wait_until(|| !work_thread.is_alive()));
        assert_eq!(
            work_thread.poll_once(&mut ()),
            PollResult::Finished {
                outcome: TaskOutcome::Faulted,
                restack: false
            }
        );
        assert_eq!(
            work_thread.status().fault.as_deref(),
            Some("solver invariant broken")
        );
    }

    #[test]
    fn test_drop_cancels_running_thread() {
        let (mut work_thread, gate) = gated();
        work_thread.start().unwrap();
        let handshake = Arc::clone(&work_thread.handshake);

        drop(work_thread);

        assert!(handshake.is_cancelled());
        gate.send(()).unwrap();
    }

    #[test]
    fn test_poll_result_restack() {
        assert!(!PollResult::NotStarted.restack());
        assert!(PollResult::AwaitingResume { restack: true }.restack());
        assert!(
            PollResult::Finished {
                outcome: TaskOutcome::Completed,
                restack: false
            }
            .is_finished()
        );
    }
}
