use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workflow endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the workflow server (e.g. http://127.0.0.1:8000)
    pub base_url: String,
    /// Workflow being edited
    pub workflow_id: u64,
    /// Header carrying the anti-forgery token
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
    /// Environment variable holding the anti-forgery token
    #[serde(default = "default_csrf_token_env")]
    pub csrf_token_env: String,
}

fn default_csrf_header() -> String {
    "X-CSRFToken".to_string()
}

fn default_csrf_token_env() -> String {
    "WORKFLOW_BUILDER_CSRF_TOKEN".to_string()
}

impl ServerConfig {
    /// Builder page of the configured workflow; saves and fetches both go here
    pub fn workflow_url(&self) -> String {
        format!(
            "{}/builder/{}/",
            self.base_url.trim_end_matches('/'),
            self.workflow_id
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// How long a notification stays on screen (default: 5000)
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
    /// How long a just-configured step stays highlighted (default: 1500)
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

fn default_notification_ms() -> u64 {
    5000
}

fn default_highlight_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub state: String,
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
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".workflow-builder/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the editor works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/workflow-builder/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("workflow-builder").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables, e.g. WORKFLOW_BUILDER__SERVER__WORKFLOW_ID=7
        builder = builder.add_source(
            config::Environment::with_prefix("WORKFLOW_BUILDER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .workflow-builder/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::local_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                workflow_id: 1,
                csrf_header: default_csrf_header(),
                csrf_token_env: default_csrf_token_env(),
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
                notification_ms: default_notification_ms(),
                highlight_ms: default_highlight_ms(),
            },
            paths: PathsConfig {
                state: ".workflow-builder".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}
