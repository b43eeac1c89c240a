//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use ht_core::{RollingWindow, ValidationError};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Default span of the rolling-average trend (30, 90 or 180).
    pub window_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ht.db"),
            window_days: RollingWindow::default().days(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HT_*)
        figment = figment.merge(Env::prefixed("HT_"));

        figment.extract()
    }

    /// The configured trend window.
    pub fn rolling_window(&self) -> Result<RollingWindow, ValidationError> {
        RollingWindow::try_from(self.window_days)
    }
}

/// Returns the platform-specific config directory for ht.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ht"))
}

/// Returns the platform-specific data directory for ht.
///
/// On Linux: `~/.local/share/ht`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ht"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_ht() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "ht");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("ht.db"));
        assert_eq!(config.rolling_window().unwrap(), RollingWindow::Days30);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"database_path = "/tmp/habits.db""#).unwrap();
        writeln!(file, "window_days = 90").unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/habits.db"));
        assert_eq!(config.rolling_window().unwrap(), RollingWindow::Days90);
    }

    #[test]
    fn test_unsupported_window_is_rejected() {
        let config = Config {
            database_path: PathBuf::from("ht.db"),
            window_days: 14,
        };
        assert_eq!(
            config.rolling_window(),
            Err(ValidationError::UnsupportedWindow { days: 14 })
        );
    }
}
