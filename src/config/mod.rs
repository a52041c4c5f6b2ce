//! Configuration management.
//!
//! Configuration is layered: built-in defaults, an optional TOML config file,
//! then `PROMPTBIN_*` environment variable overrides.

use serde::Deserialize;
use std::path::PathBuf;

/// Default web bind address.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default web port.
const DEFAULT_PORT: u16 = 5000;

/// Main configuration for promptbin.
#[derive(Debug, Clone)]
pub struct PromptBinConfig {
    /// Root directory for prompt storage.
    pub data_dir: PathBuf,
    /// Bind address for the web API.
    pub host: String,
    /// Port for the web API.
    pub port: u16,
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Root directory for prompt storage.
    pub data_dir: Option<String>,
    /// Web bind address.
    pub host: Option<String>,
    /// Web port.
    pub port: Option<u16>,
    /// Log level.
    pub log_level: Option<String>,
}

impl Default for PromptBinConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("prompts"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
        }
    }
}

impl PromptBinConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path, then applies env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file).with_env_overrides())
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/promptbin/` on macOS)
    /// 2. XDG config dir (`~/.config/promptbin/` for Unix compatibility)
    ///
    /// Falls back to defaults (plus env overrides) when no config file exists.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default().with_env_overrides();
        };

        let platform_config = base_dirs.config_dir().join("promptbin").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("promptbin")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default().with_env_overrides()
    }

    /// Converts a `ConfigFile` to `PromptBinConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(host) = file.host {
            config.host = host;
        }
        if let Some(port) = file.port {
            config.port = port;
        }
        if let Some(log_level) = file.log_level {
            config.log_level = log_level;
        }

        config
    }

    /// Applies `PROMPTBIN_*` environment variable overrides.
    #[must_use]
    fn with_env_overrides(mut self) -> Self {
        if let Ok(data_dir) = std::env::var("PROMPTBIN_DATA_DIR") {
            if !data_dir.trim().is_empty() {
                self.data_dir = PathBuf::from(data_dir);
            }
        }
        if let Ok(host) = std::env::var("PROMPTBIN_HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }
        if let Ok(port) = std::env::var("PROMPTBIN_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        if let Ok(level) = std::env::var("PROMPTBIN_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = level;
            }
        }
        self
    }
}
