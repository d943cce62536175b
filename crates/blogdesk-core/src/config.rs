//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/blogdesk/config.toml)
//! 3. Environment variables (BLOGDESK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::retention::{RetentionPolicy, DEFAULT_RETENTION_DAYS};
use crate::store::{POSTS_KEY, TRASH_KEY};

/// Environment variable prefix
const ENV_PREFIX: &str = "BLOGDESK";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for post records and image blobs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Days a post stays in the trash before it is purged
    #[serde(default = "default_auto_purge_days")]
    pub auto_purge_days: u32,

    /// Load the sample posts when no posts have been stored yet
    #[serde(default = "default_seed")]
    pub seed_on_first_run: bool,

    /// Debug log destination (defaults to `<data_dir>/debug.log`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            auto_purge_days: DEFAULT_RETENTION_DAYS,
            seed_on_first_run: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BLOGDESK_DATA_DIR, BLOGDESK_AUTO_PURGE_DAYS, BLOGDESK_SEED)
    /// 2. Config file (~/.config/blogdesk/config.toml or BLOGDESK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a config file given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // BLOGDESK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // BLOGDESK_AUTO_PURGE_DAYS
        if let Ok(val) = std::env::var(format!("{}_AUTO_PURGE_DAYS", ENV_PREFIX)) {
            self.auto_purge_days = val
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}_AUTO_PURGE_DAYS: {:?}", ENV_PREFIX, val))?;
        }

        // BLOGDESK_SEED
        if let Ok(val) = std::env::var(format!("{}_SEED", ENV_PREFIX)) {
            self.seed_on_first_run = val.eq_ignore_ascii_case("true") || val == "1";
        }

        Ok(())
    }

    /// Reject settings the store cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.auto_purge_days == 0 {
            bail!("auto_purge_days must be at least 1");
        }
        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BLOGDESK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blogdesk")
            .join("config.toml")
    }

    /// Retention policy for the trash
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.auto_purge_days)
    }

    /// Get the path to the active posts record
    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", POSTS_KEY))
    }

    /// Get the path to the trash record
    pub fn trash_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", TRASH_KEY))
    }

    /// Get the image blob directory
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    /// Get the debug log path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blogdesk")
}

fn default_auto_purge_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_seed() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "BLOGDESK_DATA_DIR",
        "BLOGDESK_AUTO_PURGE_DAYS",
        "BLOGDESK_SEED",
        "BLOGDESK_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.auto_purge_days, 30);
        assert!(config.seed_on_first_run);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("blogdesk"));
        assert_eq!(config.retention(), RetentionPolicy::default());
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/blogdesk"),
            ..Config::default()
        };

        assert_eq!(
            config.posts_path(),
            PathBuf::from("/data/blogdesk/blog-admin-blogs.json")
        );
        assert_eq!(
            config.trash_path(),
            PathBuf::from("/data/blogdesk/blog-admin-trash.json")
        );
        assert!(config.images_dir().ends_with("images"));
        assert!(config.log_path().ends_with("debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/blogdesk.log")),
            ..config
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/blogdesk.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BLOGDESK_DATA_DIR", "/tmp/blogdesk-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/blogdesk-test"));
    }

    #[test]
    fn test_env_override_auto_purge_days() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BLOGDESK_AUTO_PURGE_DAYS", "14");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.auto_purge_days, 14);
        assert_eq!(config.retention().days(), 14);

        env::set_var("BLOGDESK_AUTO_PURGE_DAYS", "soon");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_seed() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BLOGDESK_SEED", "false");
        config.apply_env_overrides().unwrap();
        assert!(!config.seed_on_first_run);

        env::set_var("BLOGDESK_SEED", "1");
        config.apply_env_overrides().unwrap();
        assert!(config.seed_on_first_run);

        env::set_var("BLOGDESK_SEED", "TRUE");
        config.seed_on_first_run = false;
        config.apply_env_overrides().unwrap();
        assert!(config.seed_on_first_run);
    }

    #[test]
    fn test_zero_retention_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);

        let result = Config::load_from_str("auto_purge_days = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/blogdesk"),
            auto_purge_days: 45,
            seed_on_first_run: false,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("auto_purge_days"));
        assert!(toml_str.contains("seed_on_first_run"));
        assert!(!toml_str.contains("log_file"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            auto_purge_days = 7
            log_file = "/custom/log.txt"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.auto_purge_days, 7);
        assert_eq!(config.log_file, Some(PathBuf::from("/custom/log.txt")));
        // Missing keys fall back to defaults
        assert!(config.seed_on_first_run);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("BLOGDESK_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config.auto_purge_days, 30);
        assert!(config.seed_on_first_run);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            auto_purge_days: 10,
            seed_on_first_run: false,
            log_file: None,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.data_dir.exists());
    }
}
