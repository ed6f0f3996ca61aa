//! Session configuration.
//!
//! Values can come from code (`SessionConfig::default()` plus field updates),
//! from any serde format, or from `OUTBOUND_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Proxy used when proxy routing is enabled and no other address is set.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8888";

pub const ENV_USE_PROXY: &str = "OUTBOUND_USE_PROXY";
pub const ENV_PROXY_URL: &str = "OUTBOUND_PROXY_URL";
pub const ENV_TIMEOUT_MS: &str = "OUTBOUND_TIMEOUT_MS";
pub const ENV_STATUS_SYMBOL: &str = "OUTBOUND_STATUS_SYMBOL";
pub const ENV_MESSAGE_SYMBOL: &str = "OUTBOUND_MESSAGE_SYMBOL";

/// Labels for the status and message fields of a caller's response envelope.
///
/// Carried for callers that render results; the pipeline never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    pub status_symbol: String,
    pub message_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Route every request through `proxy_url`.
    pub use_proxy: bool,
    pub proxy_url: String,
    /// Upper bound for a whole request, connect through body. `None` waits
    /// indefinitely unless the call carries its own deadline.
    pub timeout_ms: Option<u64>,
    pub custom: CustomConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            use_proxy: false,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            timeout_ms: None,
            custom: CustomConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Read overrides from `OUTBOUND_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_USE_PROXY) {
            config.use_proxy = parse_bool(ENV_USE_PROXY, &value)?;
        }
        if let Some(value) = lookup(ENV_PROXY_URL) {
            if !value.trim().is_empty() {
                config.proxy_url = value.trim().to_string();
            }
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            let ms = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_MS,
                value: value.clone(),
            })?;
            config.timeout_ms = Some(ms);
        }
        if let Some(value) = lookup(ENV_STATUS_SYMBOL) {
            config.custom.status_symbol = value;
        }
        if let Some(value) = lookup(ENV_MESSAGE_SYMBOL) {
            config.custom.message_symbol = value;
        }

        Ok(config)
    }

    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = proxy_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        }),
    }
}
