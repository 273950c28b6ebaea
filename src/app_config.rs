use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Fallback font name used when a dialogue references an unknown style
    #[serde(default = "default_font_name")]
    pub default_font_name: String,

    /// File extensions recognized as font files when scanning a directory
    #[serde(default = "default_font_extensions")]
    pub font_extensions: Vec<String>,

    /// Maximum number of subset jobs running at the same time
    #[serde(default = "default_concurrent_subsets")]
    pub concurrent_subsets: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    // @level: Errors only
    Error,
    // @level: Errors and warnings
    Warn,
    // @level: Normal output (default)
    #[default]
    Info,
    // @level: Verbose output
    Debug,
    // @level: Everything
    Trace,
}

// @default: Fallback font for unresolved styles
fn default_font_name() -> String {
    "Arial".to_string()
}

// @default: Extensions ttf-parser can read name tables from
fn default_font_extensions() -> Vec<String> {
    vec![
        "ttf".to_string(),
        "otf".to_string(),
        "ttc".to_string(),
        "otc".to_string(),
    ]
}

// @default: Concurrent subset jobs
fn default_concurrent_subsets() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_font_name: default_font_name(),
            font_extensions: default_font_extensions(),
            concurrent_subsets: default_concurrent_subsets(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration after loading and CLI overrides
    pub fn validate(&self) -> Result<()> {
        if self.default_font_name.trim().is_empty() {
            return Err(anyhow!("default_font_name must not be empty"));
        }

        if self.font_extensions.is_empty() {
            return Err(anyhow!("font_extensions must list at least one extension"));
        }

        if self
            .font_extensions
            .iter()
            .any(|ext| ext.trim().is_empty() || ext.starts_with('.'))
        {
            return Err(anyhow!(
                "font_extensions entries must be bare extensions without a leading dot"
            ));
        }

        if self.concurrent_subsets == 0 {
            return Err(anyhow!("concurrent_subsets must be at least 1"));
        }

        Ok(())
    }
}
