//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Environment variables override file values after loading (see
//! [`AppConfig::apply_env_overrides`]).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable holding the upstream provider credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Settings for the HTTP boundary the editor talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g. `"0.0.0.0"`, `"127.0.0.1"`).
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the upstream generative-language provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Versioned base URL of the provider API, without a trailing slash.
    pub base_url: String,
    /// Provider credential. Usually supplied through `GEMINI_API_KEY`.
    pub api_key: Option<String>,
    /// Model used for rephrasing; this task never consults the catalog.
    pub rephrase_model: String,
    /// Ordered substring rules for picking a catalog model.  `"*"` accepts
    /// the first listed model.
    pub model_preference: Vec<String>,
    /// Transport deadline for each outbound call.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1".into(),
            api_key: None,
            rephrase_model: "models/gemini-2.0-flash".into(),
            model_preference: vec![
                "gemini-2.0-pro".into(),
                "gemini-1.5-pro".into(),
                "gemini-1.5-flash".into(),
                "*".into(),
            ],
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// The credential, if present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level service configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use writing_assistant::config::AppConfig;
///
/// // Load (returns Default when file is missing), then layer env on top.
/// let mut config = AppConfig::load().unwrap();
/// config.apply_env_overrides();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP boundary settings.
    pub server: ServerConfig,
    /// Upstream provider settings.
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist so a
    /// fresh deployment can run on environment variables alone.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay `GEMINI_API_KEY` and `PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup; `apply_env_overrides` passes
    /// the process environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.llm.api_key = Some(key);
        }
        if let Some(port) = lookup(PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => log::warn!("ignoring invalid {PORT_ENV}={port:?}: {e}"),
            }
        }
    }

    /// Startup validation: a service without a credential cannot answer any
    /// request, so refuse to start instead of failing every call.
    pub fn validate(&self) -> Result<()> {
        if self.llm.credential().is_none() {
            bail!("{API_KEY_ENV} is not set (environment or llm.api_key in settings.toml)");
        }
        if self.llm.model_preference.is_empty() {
            log::warn!("llm.model_preference is empty; the first catalog model will be used");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
