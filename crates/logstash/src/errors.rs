// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the logstash adapter.

/// Errors that prevent an adapter from being constructed
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("unable to find transport {transport:?} for adapter {adapter:?}")]
    TransportNotFound { adapter: String, transport: String },

    #[error("failed to connect: {0}")]
    Connection(#[from] std::io::Error),
}

/// Errors raised while handling a single message. These never leave the stream loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write record: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route uri: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("route {0:?} has no host")]
    MissingHost(String),

    #[error("route {0:?} has no port")]
    MissingPort(String),
}
