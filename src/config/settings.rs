use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::UnreadablePolicy;
use crate::error::{ErrorContext, GraniteError, Result};
use crate::logging::LogLevel;

/// File name of the per-directory configuration
pub const PROJECT_CONFIG_FILE: &str = ".granite.toml";

/// Main Granite configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraniteConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// How directories are walked when a snapshot is captured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Follow symlinks instead of ignoring them
    pub follow_symlinks: bool,
    /// `abort` or `skip` entries that cannot be read
    pub on_unreadable: UnreadablePolicy,
    /// Regular expressions matched against forward-slash relative paths
    pub exclude: Vec<String>,
}

/// UI and display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Whether to show colored output
    pub colored: bool,
    /// Whether to show a spinner while capturing
    pub progress_bars: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: LogLevel,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            colored: std::env::var("NO_COLOR").is_err(),
            progress_bars: true,
            log_level: LogLevel::Warn,
        }
    }
}

impl GraniteConfig {
    /// Load configuration from file or create default
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_io_context(|| format!("reading config file {}", config_path.display()))?;

            toml::from_str(&content).map_err(|e| GraniteError::Config {
                message: format!("Invalid TOML: {}", e),
                path: Some(config_path.to_path_buf()),
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_io_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let content = self.to_toml()?;
        fs::write(config_path, content)
            .with_io_context(|| format!("writing config file {}", config_path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GraniteError::Config {
            message: format!("Failed to serialize config: {}", e),
            path: None,
        })
    }

    /// Get global configuration file path (~/.granite/config.toml)
    pub fn global_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| GraniteError::Config {
            message: "HOME environment variable not set".to_string(),
            path: None,
        })?;
        Ok(Path::new(&home).join(".granite").join("config.toml"))
    }

    /// Load global configuration
    pub fn load_global() -> Result<Self> {
        let config_path = Self::global_config_path()?;
        Self::load(config_path)
    }

    /// Global configuration with the directory's `[capture]` section on top.
    ///
    /// A broken file at either level is a `Config` error naming that file.
    pub fn merged_config<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::merged_from(&Self::global_config_path()?, dir.as_ref())
    }

    fn merged_from(global_path: &Path, dir: &Path) -> Result<Self> {
        let mut config = Self::load(global_path)?;
        let project_path = dir.join(PROJECT_CONFIG_FILE);

        if project_path.exists() {
            config.capture = Self::load(&project_path)?.capture;
        }

        Ok(config)
    }
}
