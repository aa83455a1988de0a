//! Editor configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable overriding the service URL.
pub const ENV_SERVICE_URL: &str = "PLANNER_SERVICE_URL";
/// Environment variable overriding the request timeout (seconds).
pub const ENV_REQUEST_TIMEOUT: &str = "PLANNER_REQUEST_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid service URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Editor settings supplied by the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the shape service. `None` keeps the editor offline.
    pub service_url: Option<String>,
    /// Timeout for each service request, in seconds.
    pub request_timeout_secs: u64,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            request_timeout_secs: 10,
            canvas_width: 1000.0,
            canvas_height: 600.0,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT.to_string(),
                    value: value.clone(),
                })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the service URL is a usable http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.service_url {
            let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::InvalidUrl {
                    url: url.clone(),
                    reason: format!("unsupported scheme {}", parsed.scheme()),
                });
            }
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(self.canvas_width) && valid(self.canvas_height)) {
            return Err(ConfigError::InvalidValue {
                key: "canvas size".to_string(),
                value: format!("{}x{}", self.canvas_width, self.canvas_height),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Canvas size in pixels.
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }
}
