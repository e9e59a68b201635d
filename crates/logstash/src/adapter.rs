// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Logstash adapter: owns the connection to the ingestion endpoint and streams records to it.
//!
//! The adapter is built once per route. Construction resolves the transport, dials the
//! endpoint and captures the token; afterwards [`LogstashAdapter::stream`] drains the host's
//! message channel until it is closed. Every message produces exactly one write attempt, in
//! receipt order. Per-message failures are logged and the loop moves on to the next message.
//! A failed write does not re-dial; later records keep using the same connection.

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::config::AdapterConfig;
use crate::errors::{ConstructionError, StreamError};
use crate::message::Message;
use crate::record::{LogstashRecord, Payload};
use crate::route::Route;
use crate::transport::{Connection, TransportRegistry};

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Payload was not JSON; a diagnostic was sent in its place.
    ParseDegraded,
    SerializeFailed,
    WriteFailed,
}

pub struct LogstashAdapter {
    route: Route,
    conn: Box<dyn Connection>,
    token: Option<String>,
}

impl std::fmt::Debug for LogstashAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogstashAdapter")
            .field("route", &self.route)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LogstashAdapter {
    /// Resolves the transport for `route`, dials it and returns the connected adapter.
    ///
    /// The transport named in the route's adapter (`logstash+udp`) wins over
    /// `config.transport`. Fails with [`ConstructionError::TransportNotFound`] when the
    /// resolved name is not registered and with [`ConstructionError::Connection`] when
    /// dialing fails. Nothing is retried.
    pub async fn new(
        route: Route,
        config: &AdapterConfig,
        registry: &TransportRegistry,
    ) -> Result<Self, ConstructionError> {
        let transport_name = route.adapter_transport(&config.transport);
        let transport = registry.lookup(transport_name).ok_or_else(|| {
            ConstructionError::TransportNotFound {
                adapter: route.adapter.clone(),
                transport: transport_name.to_string(),
            }
        })?;

        let conn = transport.dial(&route.address, &route.options).await?;
        info!(
            "logstash: connected to {} over {}",
            route.address, transport_name
        );

        Ok(Self::with_connection(route, conn, config.token.clone()))
    }

    /// Builds an adapter around an already dialed connection.
    pub fn with_connection(
        route: Route,
        conn: Box<dyn Connection>,
        token: Option<String>,
    ) -> Self {
        LogstashAdapter {
            route,
            conn,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Consumes `logstream` until the host closes it.
    pub async fn stream(mut self, mut logstream: mpsc::Receiver<Message>) {
        debug!("logstash: streaming to {}", self.route.address);
        while let Some(message) = logstream.recv().await {
            self.send(&message).await;
        }
        debug!("logstash: log stream closed for {}", self.route.address);
    }

    /// Transforms and writes one message. Errors are logged, never returned.
    pub async fn send(&mut self, message: &Message) -> SendOutcome {
        let payload = Payload::parse(&message.data);
        let degraded = payload.is_degraded();
        if let Payload::Degraded(ref diagnostic) = payload {
            warn!(
                "logstash: payload from container {} is not json: {}",
                message.container.id, diagnostic
            );
        }

        let record = LogstashRecord::new(message, payload, self.token.as_deref());
        match self.write_record(&record).await {
            Ok(written) => {
                trace!("logstash: wrote {} bytes", written);
                if degraded {
                    SendOutcome::ParseDegraded
                } else {
                    SendOutcome::Sent
                }
            }
            Err(e @ StreamError::Serialization(_)) => {
                error!("logstash: {}", e);
                SendOutcome::SerializeFailed
            }
            Err(e @ StreamError::Write(_)) => {
                error!("logstash: {}", e);
                SendOutcome::WriteFailed
            }
        }
    }

    async fn write_record(&mut self, record: &LogstashRecord) -> Result<usize, StreamError> {
        let js = record.to_vec()?;
        Ok(self.conn.write(&js).await?)
    }
}
