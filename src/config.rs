//! Environment-driven configuration
//!
//! Every value can be supplied through the process environment (or a `.env` file loaded
//! by the binaries). Missing values fall back to the defaults below; malformed values are
//! reported as [`ConfigError`] instead of being silently replaced.

use std::ops::RangeInclusive;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8080";

const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be between 0.0 and 2.0, got {value}")]
    TemperatureOutOfRange { key: &'static str, value: f64 },
    #[error("{key} must be a port number, got {value:?}")]
    InvalidPort { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Settings handed unmodified to the completion provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ProviderConfig {
    /// Reads `CHAT_API_KEY`, `CHAT_MODEL` and `CHAT_TEMPERATURE`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is blank or the temperature is not a number in `0.0..=2.0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env_lookup)
    }

    /// Same as `from_env` but reading from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// See `from_env`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("CHAT_API_KEY").filter(|key| !key.trim().is_empty());

        let model = match lookup("CHAT_MODEL") {
            Some(model) if model.trim().is_empty() => return Err(ConfigError::Empty { key: "CHAT_MODEL" }),
            Some(model) => model.trim().to_string(),
            None => DEFAULT_MODEL.to_string(),
        };

        let temperature = match lookup("CHAT_TEMPERATURE") {
            Some(raw) => parse_temperature(&raw)?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key,
            model,
            temperature,
        })
    }
}

/// Bind address of the proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `CHAT_HOST` and `CHAT_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is not a valid `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env_lookup)
    }

    /// Same as `from_env` but reading from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// See `from_env`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("CHAT_HOST")
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("CHAT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                key: "CHAT_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }
}

/// Settings for the terminal chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub proxy_url: String,
    pub stream: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            stream: false,
        }
    }
}

impl UiConfig {
    /// Reads `CHAT_PROXY_URL` and `CHAT_UI_STREAM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env_lookup)
    }

    /// Same as `from_env` but reading from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// See `from_env`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let proxy_url = match lookup("CHAT_PROXY_URL") {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty { key: "CHAT_PROXY_URL" }),
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => DEFAULT_PROXY_URL.to_string(),
        };

        let stream = lookup("CHAT_UI_STREAM").is_some_and(|raw| is_truthy(&raw));

        Ok(Self { proxy_url, stream })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_temperature(raw: &str) -> Result<f64, ConfigError> {
    let value = raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidNumber {
        key: "CHAT_TEMPERATURE",
        value: raw.to_string(),
    })?;

    if !TEMPERATURE_RANGE.contains(&value) {
        return Err(ConfigError::TemperatureOutOfRange {
            key: "CHAT_TEMPERATURE",
            value,
        });
    }

    Ok(value)
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
