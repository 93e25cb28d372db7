//! Client configuration.
//!
//! Resolved from environment variables or a YAML file:
//!
//! - `GREENMIND_API_URL`: backend base URL (default: `http://localhost:3000/api`)
//! - `GREENMIND_AI_URL`: AI service base URL (default: `http://localhost:8000`)
//! - `GREENMIND_HTTP_TIMEOUT`: request timeout in seconds (default: 30)
//! - `GREENMIND_VERIFY`: `false`/`0` disables the verification fan-out
//!
//! ```yaml
//! api_base_url: "https://api.greenmind.example/api"
//! ai_base_url: "https://ai.greenmind.example"
//! timeout_secs: 20
//! verification_enabled: true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GreenMindError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_AI_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoints and transport settings for the remote services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend REST API (user profile, question sets).
    #[serde(default = "default_api_url")]
    pub api_base_url: String,
    /// AI service (scoring, metric updates, verification).
    #[serde(default = "default_ai_url")]
    pub ai_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_verification")]
    pub verification_enabled: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ai_url() -> String {
    DEFAULT_AI_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_verification() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            ai_base_url: default_ai_url(),
            timeout_secs: default_timeout(),
            verification_enabled: default_verification(),
        }
    }
}

impl ClientConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("GREENMIND_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("GREENMIND_AI_URL") {
            config.ai_base_url = url;
        }
        if let Some(raw) = lookup("GREENMIND_HTTP_TIMEOUT") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                GreenMindError::Config(format!("GREENMIND_HTTP_TIMEOUT is not a number: '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("GREENMIND_VERIFY") {
            config.verification_enabled =
                !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file on disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("api_base_url", &self.api_base_url),
            ("ai_base_url", &self.ai_base_url),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GreenMindError::Config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(GreenMindError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a path onto the backend base URL.
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.api_base_url, path)
    }

    /// Join a path onto the AI service base URL.
    pub fn ai_url(&self, path: &str) -> String {
        join_url(&self.ai_base_url, path)
    }

    /// Backend URL built from path segments, each percent-encoded, so ids
    /// containing `/`, `?` or `#` stay inside their segment.
    pub fn api_url_segments(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            GreenMindError::Config(format!("invalid api_base_url '{}': {e}", self.api_base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                GreenMindError::Config(format!(
                    "api_base_url cannot take a path: '{}'",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
