use std::fmt;
use std::time::Instant;

/// Lifecycle phase of one work thread.
///
/// `Created → Running → {Paused ⇄ Running}* → {Completed | Cancelled | Faulted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPhase {
    Created,
    Running,
    Paused,
    Completed,
    Cancelled,
    Faulted,
}

impl TaskPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Faulted)
    }

    /// Checks the edges of the lifecycle state machine
    pub fn can_transition_to(self, next: TaskPhase) -> bool {
        use TaskPhase::*;
        match (self, next) {
            (Created, Running) => true,
            (Running, Paused) | (Paused, Running) => true,
            (Running | Paused, Completed | Cancelled | Faulted) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// How a work body ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Returned normally
    Completed,
    /// Observed the cancel signal and exited early
    Cancelled,
    /// Returned an error or panicked
    Faulted,
}

impl From<TaskOutcome> for TaskPhase {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Completed => TaskPhase::Completed,
            TaskOutcome::Cancelled => TaskPhase::Cancelled,
            TaskOutcome::Faulted => TaskPhase::Faulted,
        }
    }
}

/// Observable status of a work thread.
///
/// Owned by [`crate::state::TaskMonitor`], which is the only writer; readers get
/// clones or closures over it.
#[derive(Clone, Debug)]
pub struct TaskStatus {
    pub task_name: String,
    pub phase: TaskPhase,

    /// Pause cycle currently open, if the worker is paused
    pub current_cycle: Option<u64>,
    pub pause_cycles: u64,
    pub cancel_requested: bool,

    /// Message of the error or panic that ended the work body
    pub fault: Option<String>,

    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl TaskStatus {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            phase: TaskPhase::Created,
            current_cycle: None,
            pause_cycles: 0,
            cancel_requested: false,
            fault: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        match self.phase {
            TaskPhase::Completed => Some(TaskOutcome::Completed),
            TaskPhase::Cancelled => Some(TaskOutcome::Cancelled),
            TaskPhase::Faulted => Some(TaskOutcome::Faulted),
            _ => None,
        }
    }

    pub fn run_time(&self) -> Option<std::time::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            (Some(start), None) => Some(start.elapsed()),
            _ => None,
        }
    }
}
