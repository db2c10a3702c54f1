use crate::models::WorkThreadConfig;
use ::config::{Config, Environment, File, FileFormat};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the configuration inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "WorkThread Config.yaml";

/// Prefix of environment variables that override the configuration file,
/// e.g. `WORKTHREAD__POLL__WAIT_CYCLE_MS=25`
pub const ENV_PREFIX: &str = "WORKTHREAD";

/// Configuration manager for loading and saving the YAML configuration file.
///
/// Loading layers three sources, later ones winning:
/// 1. Built-in defaults ([`WorkThreadConfig::default`])
/// 2. `WorkThread Config.yaml` in the configuration directory (optional)
/// 3. `WORKTHREAD__<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the configuration file (e.g., "WorkThread Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the configuration file with environment overrides.
    ///
    /// # Returns
    /// The loaded configuration, or defaults for anything not set
    pub fn load_config(&self) -> Result<WorkThreadConfig> {
        self.load_with_environment(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }

    fn load_with_environment(&self, environment: Environment) -> Result<WorkThreadConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let settings = Config::builder()
            .add_source(
                File::from(self.config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: WorkThreadConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!(
            "Loaded config from {} (poll={}ms, wait_cycle={}ms)",
            self.config_path,
            config.poll.poll_interval_ms,
            config.poll.wait_cycle_ms
        );
        Ok(config)
    }

    /// Save the configuration file.
    ///
    /// # Arguments
    /// * `config` - The configuration to save
    pub fn save_config(&self, config: &WorkThreadConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    fn environment_from(vars: &[(&str, &str)]) -> Environment {
        let source: ::config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigManager::environment().source(Some(source))
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = manager.load_with_environment(environment_from(&[])).unwrap();

        assert_eq!(config, WorkThreadConfig::default());
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = WorkThreadConfig::default();
        config.poll.wait_cycle_ms = 15;
        config.demo.max_pauses = 3;
        manager.save_config(&config).unwrap();

        let loaded = manager.load_with_environment(environment_from(&[])).unwrap();
        assert_eq!(loaded.poll.wait_cycle_ms, 15);
        assert_eq!(loaded.demo.max_pauses, 3);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = WorkThreadConfig::default();
        config.poll.poll_interval_ms = 250;
        manager.save_config(&config).unwrap();

        let loaded = manager
            .load_with_environment(environment_from(&[
                ("WORKTHREAD__POLL__POLL_INTERVAL_MS", "40"),
                ("WORKTHREAD__LOGGING__DEBUG_MODE", "true"),
            ]))
            .unwrap();

        assert_eq!(loaded.poll.poll_interval_ms, 40);
        assert!(loaded.logging.debug_mode);
    }

    #[test]
    fn test_numeric_looking_strings_survive_environment() {
        let (manager, _temp_dir) = create_test_config_manager();
        let puzzle = concat!(
            "003020600900305001001806400",
            "008102900700000008006708200",
            "002609500800203009005010300",
        );

        let loaded = manager
            .load_with_environment(environment_from(&[
                ("WORKTHREAD__DEMO__PUZZLE", puzzle),
                ("WORKTHREAD__POLL__THREAD_NAME", "007"),
                ("WORKTHREAD__DEMO__PAUSE_EVERY", "12"),
            ]))
            .unwrap();

        assert_eq!(loaded.demo.puzzle, puzzle);
        assert_eq!(loaded.poll.thread_name, "007");
        assert_eq!(loaded.demo.pause_every, 12);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "poll: [not, a, map").unwrap();

        assert!(manager.load_with_environment(environment_from(&[])).is_err());
    }
}
