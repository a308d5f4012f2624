// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridge configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::messages::Locale;

/// Configuration for talking to the remote container service.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the remote service, e.g. `https://10.0.0.2:8000`.
    /// Empty means unconfigured; every remote call then fails without I/O.
    pub base_url: String,
    /// Bearer key sent with every request.
    pub api_key: Option<String>,
    /// Verify the remote TLS certificate. Off by default since the
    /// service usually runs with a self-signed certificate.
    pub verify_tls: bool,
    /// Timeout for power actions and NAT rule changes.
    pub default_timeout: Duration,
    /// Timeout for read-only status probes.
    pub probe_timeout: Duration,
    /// Timeout for provision, terminate and exec.
    pub long_timeout: Duration,
    /// Language of panel-facing messages.
    pub locale: Locale,
    /// Append audit records as JSON lines to this file.
    pub audit_log: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            verify_tls: false,
            default_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
            long_timeout: Duration::from_secs(180),
            locale: Locale::En,
            audit_log: None,
        }
    }
}

impl BridgeConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LXC_BRIDGE_BASE_URL`: Remote service base URL (default: empty)
    /// - `LXC_BRIDGE_API_KEY`: Bearer key (optional)
    /// - `LXC_BRIDGE_VERIFY_TLS`: Verify TLS certificates (default: "false")
    /// - `LXC_BRIDGE_DEFAULT_TIMEOUT_SECS`: Default timeout (default: 30)
    /// - `LXC_BRIDGE_PROBE_TIMEOUT_SECS`: Status probe timeout (default: 10)
    /// - `LXC_BRIDGE_LONG_TIMEOUT_SECS`: Provision/terminate/exec timeout (default: 180)
    /// - `LXC_BRIDGE_LOCALE`: `en` or `zh-CN` (default: "en")
    /// - `LXC_BRIDGE_AUDIT_LOG`: JSON-lines audit file (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = std::env::var("LXC_BRIDGE_BASE_URL").unwrap_or_default();

        let api_key = std::env::var("LXC_BRIDGE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let verify_tls = match std::env::var("LXC_BRIDGE_VERIFY_TLS") {
            Ok(v) => parse_bool(&v)
                .ok_or(ConfigError::Invalid("LXC_BRIDGE_VERIFY_TLS", "must be true or false"))?,
            Err(_) => defaults.verify_tls,
        };

        let default_timeout =
            secs_from_env("LXC_BRIDGE_DEFAULT_TIMEOUT_SECS", defaults.default_timeout)?;
        let probe_timeout = secs_from_env("LXC_BRIDGE_PROBE_TIMEOUT_SECS", defaults.probe_timeout)?;
        let long_timeout = secs_from_env("LXC_BRIDGE_LONG_TIMEOUT_SECS", defaults.long_timeout)?;

        let locale = match std::env::var("LXC_BRIDGE_LOCALE") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("LXC_BRIDGE_LOCALE", "must be en or zh-CN"))?,
            Err(_) => defaults.locale,
        };

        let audit_log = std::env::var("LXC_BRIDGE_AUDIT_LOG")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            base_url,
            api_key,
            verify_tls,
            default_timeout,
            probe_timeout,
            long_timeout,
            locale,
            audit_log,
        })
    }

    /// Set the remote base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the bearer key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_long_timeout(mut self, timeout: Duration) -> Self {
        self.long_timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log = Some(path.into());
        self
    }

    /// Base URL without surrounding whitespace or trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn secs_from_env(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::Invalid(key, "must be a positive number of seconds")),
        Err(_) => Ok(default),
    }
}
