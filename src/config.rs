//! Application configuration
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `ASKPANEL_*` environment variables, then command-line overrides.

use crate::error::{AskError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Endpoint of the reference deployment
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/ask";

/// File looked up next to the executable when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "askpanel.json";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where queries are POSTed
    pub endpoint: String,
    /// Health probe URL; derived from `endpoint` when unset
    pub health_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// `tracing` filter directive, e.g. `info` or `askpanel=debug`
    pub log_level: String,
    /// Log file; defaults to `askpanel.log` next to the executable
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            health_url: None,
            timeout_secs: 30,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Overrides coming from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Load the full layered configuration for this process
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match &overrides.config_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;

        if let Some(endpoint) = &overrides.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            config.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| AskError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `ASKPANEL_*` variables through the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("ASKPANEL_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = lookup("ASKPANEL_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                AskError::Config(format!("ASKPANEL_TIMEOUT_SECS is not a number: '{}'", timeout))
            })?;
        }
        if let Some(level) = lookup("ASKPANEL_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Check that the endpoint is a usable HTTP URL and the timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;
        if let Some(health) = &self.health_url {
            parse_http_url(health)?;
        }
        if self.timeout_secs == 0 {
            return Err(AskError::Config("timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        parse_http_url(&self.endpoint)
    }

    /// Health probe URL: explicit, or the endpoint's origin plus `/healthz/`
    pub fn health_url(&self) -> Result<Url> {
        if let Some(health) = &self.health_url {
            return parse_http_url(health);
        }
        let endpoint = self.endpoint_url()?;
        endpoint
            .join("/healthz/")
            .map_err(|e| AskError::Config(format!("cannot derive health URL: {}", e)))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AskError::Config(format!("invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AskError::Config(format!(
            "unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// `askpanel.json` in the executable's directory
fn default_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.join(CONFIG_FILE_NAME)))
}
