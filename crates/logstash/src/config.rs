// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use std::env;

pub const DEFAULT_TRANSPORT: &str = "tcp";

/// Configuration for a logstash adapter, resolved once by the bootstrap layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Transport used when the route does not name one (e.g., tcp, udp)
    pub transport: String,
    /// Token injected into every outbound record
    pub token: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            transport: DEFAULT_TRANSPORT.to_string(),
            token: None,
            log_level: "info".to_string(),
        }
    }
}

/// Reads an environment variable, treating an empty value as unset.
fn getopt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

impl AdapterConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let transport =
            getopt("LOGSTASH_TRANSPORT").unwrap_or_else(|| DEFAULT_TRANSPORT.to_string());
        let token = getopt("LOGSTASH_LOGZIO_TOKEN");
        let log_level = getopt("LOGSTASH_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| "info".to_string());

        let config = Self {
            transport,
            token,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "LOGSTASH_TRANSPORT cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
