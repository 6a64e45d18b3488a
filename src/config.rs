// Configuration File Support
//
// This module provides configuration file parsing for ci-limits.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory: ~/.config/ci-limits/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::limits::{Limit, PlanTable};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Plan limits and the public-app default
    pub plans: PlanTable,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// Environment overrides apply whether or not the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the resulting configuration is invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;

            tracing::info!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        let config = config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/ci-limits/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "ci-limits", "ci-limits") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("ci-limits").join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - CI_LIMITS_LOG_LEVEL
    /// - CI_LIMITS_LOG_FORMAT
    /// - CI_LIMITS_FREE_PLAN, CI_LIMITS_DEVELOPER_PLAN,
    ///   CI_LIMITS_ORGANIZATION_PLAN, CI_LIMITS_PUBLIC_APP_PLAN
    ///   (`concurrent,minutes,builds_per_month,team_members`)
    ///
    /// # Errors
    ///
    /// Returns an error if a plan variable is set but does not parse.
    fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("CI_LIMITS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CI_LIMITS_LOG_FORMAT") {
            self.logging.format = format;
        }

        override_limit("CI_LIMITS_FREE_PLAN", &mut self.plans.free)?;
        override_limit("CI_LIMITS_DEVELOPER_PLAN", &mut self.plans.developer)?;
        override_limit("CI_LIMITS_ORGANIZATION_PLAN", &mut self.plans.organization)?;
        override_limit("CI_LIMITS_PUBLIC_APP_PLAN", &mut self.plans.public_app)?;

        Ok(self)
    }

    /// Validate the configuration
    ///
    /// Plan limits are not range-checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

fn override_limit(var: &str, slot: &mut Limit) -> Result<()> {
    let Ok(value) = std::env::var(var) else {
        return Ok(());
    };
    *slot = value
        .parse::<Limit>()
        .with_context(|| format!("Invalid {}={:?}", var, value))?;
    Ok(())
}
