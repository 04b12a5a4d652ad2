//! Runtime configuration, read from the environment (and `.env` when present).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CART_API_BASE_URL` | unset: the in-process backend is used |
//! | `CART_API_TOKEN` | unset |
//! | `CART_HTTP_TIMEOUT_SECS` | `15` |
//! | `CART_CHANNEL_BUFFER` | `32` |
//! | `CART_QUIET_VALIDATION` | `true` |

use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Base URL an [`HttpCartService`](crate::service::HttpCartService) uses when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Remote cart API. When unset the binary runs against the in-process service.
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    /// Capacity of the in-process service's request channel.
    pub channel_buffer: usize,
    /// Keep validation-class update failures out of notifications.
    pub quiet_validation: bool,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            quiet_validation: true,
        }
    }
}

impl CartConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(base_url = ?config.api_base_url, "Cart configuration loaded");
        Ok(config)
    }

    /// Builds the configuration from any variable source. Unset or blank values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let http_timeout = match get("CART_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse("CART_HTTP_TIMEOUT_SECS", &raw)?),
            None => defaults.http_timeout,
        };
        let channel_buffer = match get("CART_CHANNEL_BUFFER") {
            Some(raw) => match parse::<usize>("CART_CHANNEL_BUFFER", &raw)? {
                0 => return Err(invalid("CART_CHANNEL_BUFFER", &raw)),
                n => n,
            },
            None => defaults.channel_buffer,
        };
        let quiet_validation = match get("CART_QUIET_VALIDATION") {
            Some(raw) => parse_flag("CART_QUIET_VALIDATION", &raw)?,
            None => defaults.quiet_validation,
        };

        Ok(Self {
            api_base_url: get("CART_API_BASE_URL"),
            api_token: get("CART_API_TOKEN"),
            http_timeout,
            channel_buffer,
            quiet_validation,
        })
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(name, raw))
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, raw)),
    }
}
