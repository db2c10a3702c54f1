use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration from `WorkThread Config.yaml`
///
/// Every section falls back to its defaults when missing, so an empty or absent
/// file yields a usable configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkThreadConfig {
    pub poll: PollSettings,
    pub logging: LogSettings,
    pub demo: DemoSettings,
}

/// Timing of the controller poll and the worker's pause wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Controller timer cadence
    pub poll_interval_ms: u64,

    /// Upper bound of one condvar wait while a worker is paused
    pub wait_cycle_ms: u64,

    /// Name given to spawned worker threads
    pub thread_name: String,
}

impl PollSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn wait_cycle(&self) -> Duration {
        Duration::from_millis(self.wait_cycle_ms.max(1))
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            wait_cycle_ms: default_wait_cycle_ms(),
            thread_name: "workthread-worker".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub log_dir: String,
    pub log_prefix: String,
    pub debug_mode: bool,
    pub console_output: bool,

    /// Write the log file as JSON lines instead of text
    pub json_format: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            log_prefix: "workthread".to_string(),
            debug_mode: false,
            console_output: true,
            json_format: false,
        }
    }
}

/// Settings for the bundled sudoku demo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Puzzle in row-major order, `0` or `.` for empty cells
    pub puzzle: String,

    /// Pause to show results after this many placements (0 = never pause)
    pub pause_every: u64,

    /// Cancel the worker after this many pauses (0 = never cancel)
    pub max_pauses: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            puzzle: concat!(
                "530070000",
                "600195000",
                "098000060",
                "800060003",
                "400803001",
                "700020006",
                "060000280",
                "000419005",
                "000080079",
            )
            .to_string(),
            pause_every: 500,
            max_pauses: 0,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_wait_cycle_ms() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_settings_defaults() {
        let settings = PollSettings::default();
        assert_eq!(settings.poll_interval_ms, 100);
        assert_eq!(settings.wait_cycle_ms, 50);
        assert_eq!(settings.wait_cycle(), Duration::from_millis(50));
        assert_eq!(settings.thread_name, "workthread-worker");
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let settings = PollSettings {
            poll_interval_ms: 0,
            wait_cycle_ms: 0,
            ..PollSettings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
        assert_eq!(settings.wait_cycle(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: WorkThreadConfig =
            serde_yaml_ng::from_str("poll:\n  wait_cycle_ms: 10\n").unwrap();
        assert_eq!(config.poll.wait_cycle_ms, 10);
        assert_eq!(config.poll.poll_interval_ms, 100);
        assert_eq!(config.logging, LogSettings::default());
    }

    #[test]
    fn test_default_demo_puzzle_has_81_cells() {
        assert_eq!(DemoSettings::default().puzzle.len(), 81);
    }
}
