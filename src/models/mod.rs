//! Data models for work threads.
//!
//! - [`TaskStatus`]: observable lifecycle state of one work thread, owned by
//!   [`TaskMonitor`](crate::state::TaskMonitor)
//! - [`TaskPhase`] / [`TaskOutcome`]: the lifecycle state machine and its terminal subset
//! - [`WorkThreadConfig`]: poll timing, logging and demo settings loaded from
//!   `WorkThread Config.yaml`

pub mod config;
pub mod task_state;

pub use config::{DemoSettings, LogSettings, PollSettings, WorkThreadConfig};
pub use task_state::{TaskOutcome, TaskPhase, TaskStatus};
