use super::logging::{LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

const CONFIG_FILE: &str = ".extestrc.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub contention: ContentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormatName,

    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default = "default_false")]
    pub span_events: bool,

    /// Stream to write to when no directory is set
    #[serde(default)]
    pub target: LogTarget,

    /// Write to a daily rolling file in this directory; overrides `target`
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    Stdout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatName {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentionConfig {
    /// Fibonacci depth used by `extest contend`
    #[serde(default = "default_depth")]
    pub depth: i64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormatName::default(),
            filter: None,
            span_events: false,
            target: LogTarget::default(),
            directory: None,
        }
    }
}

impl Default for ContentionConfig {
    fn default() -> Self {
        Self { depth: default_depth() }
    }
}

fn default_level() -> String { "warn".to_string() }
fn default_false() -> bool { false }
fn default_depth() -> i64 { 30 }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Find `.extestrc.toml` in the current directory or a parent; defaults
    /// when none is found or it does not parse.
    pub fn discover() -> Self {
        let mut current = std::env::current_dir().ok();

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                if let Ok(config) = Self::load(&config_path) {
                    return config;
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Logging settings as a [`LogConfig`]
    pub fn log_config(&self) -> Result<LogConfig, String> {
        let level: Level = self
            .logging
            .level
            .parse()
            .map_err(|_| format!("Unknown log level: {}", self.logging.level))?;

        let format = match self.logging.format {
            LogFormatName::Pretty => LogFormat::Pretty,
            LogFormatName::Compact => LogFormat::Compact,
            LogFormatName::Json => LogFormat::Json,
        };

        let output = match &self.logging.directory {
            Some(dir) => LogOutput::File {
                directory: dir.to_string_lossy().to_string(),
                prefix: "extest".to_string(),
            },
            None => match self.logging.target {
                LogTarget::Stderr => LogOutput::Stderr,
                LogTarget::Stdout => LogOutput::Stdout,
            },
        };

        let mut config = LogConfig::new()
            .with_level(level)
            .with_format(format)
            .with_output(output)
            .with_span_events(self.logging.span_events);
        if let Some(filter) = &self.logging.filter {
            config = config.with_filter(filter.clone());
        }
        Ok(config)
    }
}
