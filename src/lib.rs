// WorkThread - pausable, cancellable background work driven by a polling controller
//
// This is the library crate containing the worker/controller handshake and the
// lifecycle handle. The binary crate (main.rs) runs a headless sudoku demo.

pub mod config;
pub mod demo;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod signals;
pub mod state;
pub mod subject;
pub mod task;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::TaskMetrics;
pub use models::{PollSettings, TaskOutcome, TaskPhase, TaskStatus, WorkThreadConfig};
pub use signals::{Handshake, SignalSnapshot, Wake};
pub use state::{TaskEvent, TaskMonitor};
pub use subject::SharedSubject;
pub use task::{PollResult, PollWindow, TaskError, WorkContext, WorkError, WorkThread, WorkerTask};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
