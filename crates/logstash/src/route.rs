// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Destination descriptors for adapter instances.
//!
//! A route is written as a URI whose scheme names the adapter and, optionally, the
//! transport after a `+`:
//!
//! ```text
//! logstash://10.0.0.5:5000
//! logstash+udp://10.0.0.5:5000?key=value
//! ```

use std::collections::HashMap;

use url::Url;

use crate::errors::RouteError;

/// Destination of a single adapter instance. Read once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Adapter name, possibly suffixed with `+transport`
    pub adapter: String,
    /// `host:port` of the ingestion endpoint
    pub address: String,
    /// Free-form options handed to the transport when dialing
    pub options: HashMap<String, String>,
}

impl Route {
    pub fn new(adapter: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            address: address.into(),
            options: HashMap::new(),
        }
    }

    /// Parses a route URI such as `logstash+tcp://host:5000?opt=val`.
    pub fn parse(uri: &str) -> Result<Self, RouteError> {
        let url = Url::parse(uri)?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| RouteError::MissingHost(uri.to_string()))?;
        let port = url
            .port()
            .ok_or_else(|| RouteError::MissingPort(uri.to_string()))?;
        let options = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Ok(Self {
            adapter: url.scheme().to_string(),
            address: format!("{host}:{port}"),
            options,
        })
    }

    /// Returns the transport named in the adapter (`logstash+udp` gives `udp`), or
    /// `default` when the adapter names none.
    pub fn adapter_transport<'a>(&'a self, default: &'a str) -> &'a str {
        match self.adapter.split_once('+') {
            Some((_, transport)) if !transport.is_empty() => transport,
            _ => default,
        }
    }
}
