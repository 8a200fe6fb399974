// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::client::ElastClient;
use crate::error::ElastError;
use std::env;
use std::time::Duration;
use tracing::warn;

pub const ENV_TIMEOUT: &str = "elast_timeout";
pub const ENV_ENABLE: &str = "elast_enable";
pub const ENV_HOST: &str = "elast_host";
pub const ENV_PORT: &str = "elast_port";

const DEFAULT_TIMEOUT_SECS: u64 = 1;

/// Backend connectivity settings read from the `elast_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElastConfig {
    /// Whether documents should be shipped at all.
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<String>,
    /// Applied to connecting and to each request.
    pub timeout: Duration,
}

impl Default for ElastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: None,
            port: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ElastConfig {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ElastConfig::from_env`], reading values through `lookup`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = Duration::from_secs(read_timeout_secs(&lookup));
        Self::resolve_with_timeout(&lookup, timeout)
    }

    /// Reads everything but the timeout, which the caller supplies.
    #[must_use]
    pub fn from_env_with_timeout(timeout: Duration) -> Self {
        Self::resolve_with_timeout(&|key: &str| env::var(key).ok(), timeout)
    }

    fn resolve_with_timeout<F>(lookup: &F, timeout: Duration) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut enabled = match lookup(ENV_ENABLE) {
            None => {
                warn!("{ENV_ENABLE} environment variable not set. Using default true => elasticsearch enabled");
                true
            }
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!("{ENV_ENABLE} has invalid value '{value}' => elasticsearch disabled");
                false
            }),
        };

        let host = non_empty(lookup(ENV_HOST));
        if host.is_none() {
            warn!("{ENV_HOST} environment variable required but not set. Elasticsearch feature will be disabled");
            enabled = false;
        }
        let port = if host.is_some() {
            let port = non_empty(lookup(ENV_PORT));
            if port.is_none() {
                warn!("{ENV_PORT} environment variable required but not set. Elasticsearch feature will be disabled");
                enabled = false;
            }
            port
        } else {
            None
        };

        Self {
            enabled,
            host,
            port,
            timeout,
        }
    }

    /// `host:port`, with an `http://` scheme when the host carries none.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        let (host, port) = (self.host.as_deref()?, self.port.as_deref()?);
        let host = host.trim_end_matches('/');
        if host.contains("://") {
            Some(format!("{host}:{port}"))
        } else {
            Some(format!("http://{host}:{port}"))
        }
    }

    /// Builds a client and checks cluster health.
    ///
    /// `Ok(None)` means the feature is disabled or unconfigured and nothing touched the
    /// network. An error means the backend should be treated as disabled for now.
    pub async fn connect(&self) -> Result<Option<ElastClient>, ElastError> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(address) = self.address() else {
            return Ok(None);
        };
        let client = ElastClient::new(&address, self.timeout)?;
        client.health().await?;
        Ok(Some(client))
    }
}

/// Resolves the environment with the given timeout and connects to the backend.
pub async fn configure(timeout: Duration) -> Result<Option<ElastClient>, ElastError> {
    ElastConfig::from_env_with_timeout(timeout).connect().await
}

fn read_timeout_secs<F>(lookup: &F) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(ENV_TIMEOUT) {
        None => {
            warn!("{ENV_TIMEOUT} environment variable not set. Using default {DEFAULT_TIMEOUT_SECS}");
            DEFAULT_TIMEOUT_SECS
        }
        Some(value) => value.trim().parse::<u64>().unwrap_or_else(|_| {
            warn!("{ENV_TIMEOUT} has invalid value '{value}'. Using default {DEFAULT_TIMEOUT_SECS}");
            DEFAULT_TIMEOUT_SECS
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts the spellings `1 t T TRUE true True` and `0 f F FALSE false False`.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
