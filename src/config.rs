use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the listing collection and logs. Defaults to the
    /// platform data dir (e.g. ~/.local/share/homelet).
    #[serde(default = "default_data_dir")]
    pub data: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("homelet"))
        .unwrap_or_else(|| PathBuf::from(".homelet"))
        .to_string_lossy()
        .to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { data: default_data_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// TUI redraw/poll interval in milliseconds
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,

    /// Currency prefix shown next to prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Max characters of a title shown in the browser rows
    #[serde(default = "default_title_max_length")]
    pub title_max_length: usize,
}

fn default_refresh_rate() -> u64 {
    250
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_title_max_length() -> usize {
    40
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
            currency: default_currency(),
            title_max_length: default_title_max_length(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so homelet works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/homelet/
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("homelet").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with HOMELET_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("HOMELET")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to ~/.config/homelet/config.toml
    pub fn save(&self) -> Result<()> {
        let Some(config_dir) = dirs::config_dir() else {
            anyhow::bail!("No config directory available on this platform");
        };
        let config_path = config_dir.join("homelet").join("config.toml");

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to the data directory
    pub fn data_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.data);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get path to the durable listing collection file
    pub fn listings_path(&self) -> PathBuf {
        self.data_path().join("listings.json")
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}
