use thiserror::Error;

/// Errors returned to the controller by [`WorkThread`](super::WorkThread)
#[derive(Error, Debug)]
pub enum TaskError {
    /// `start()` was called on a work thread that was already started
    #[error("Work thread {0} was already started")]
    AlreadyStarted(String),

    #[error("Failed to spawn work thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ways a work body can end other than normal completion
///
/// Returned from [`WorkerTask::run_work`](super::WorkerTask::run_work). Checkpoints
/// produce `Cancelled`, so a body can simply use `?` to exit when cancelled.
#[derive(Error, Debug)]
pub enum WorkError {
    #[error("Work cancelled")]
    Cancelled,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl WorkError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_keeps_context() {
        let err: WorkError = anyhow::anyhow!("board is inconsistent").into();
        assert!(!err.is_cancelled());
        assert_eq!(err.to_string(), "board is inconsistent");
    }

    #[test]
    fn test_already_started_message() {
        let err = TaskError::AlreadyStarted("solver".to_string());
        assert_eq!(err.to_string(), "Work thread solver was already started");
    }
}
