// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Pluggable transports used to reach the ingestion endpoint.
//!
//! Transports are registered by name in a [`TransportRegistry`] during startup and looked up
//! once when an adapter is constructed. The registry is never mutated afterwards.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

pub type TransportOptions = HashMap<String, String>;

/// An open, write-only channel to the remote endpoint.
#[async_trait]
pub trait Connection: Send {
    /// Writes one serialized record. Returns the number of bytes written.
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// Strategy that knows how to dial a [`Connection`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dial(
        &self,
        address: &str,
        options: &TransportOptions,
    ) -> io::Result<Box<dyn Connection>>;
}

/// Name to transport lookup table.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `tcp` and `udp` transports.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("tcp", Arc::new(TcpTransport));
        registry.register("udp", Arc::new(UdpTransport));
        registry
    }

    /// Registers `transport` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, transport: Arc<dyn Transport>) {
        let name = name.into();
        debug!("Registering transport {}", name);
        self.transports.insert(name, transport);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Transport>> {
        self.transports.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("transports", &self.names())
            .finish()
    }
}

/// Stream transport; records are written back-to-back on a single TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

struct TcpConnection(TcpStream);

#[async_trait]
impl Transport for TcpTransport {
    async fn dial(
        &self,
        address: &str,
        _options: &TransportOptions,
    ) -> io::Result<Box<dyn Connection>> {
        let stream = TcpStream::connect(address).await?;
        debug!("tcp: connected to {}", address);
        Ok(Box::new(TcpConnection(stream)))
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_all(buf).await?;
        Ok(buf.len())
    }
}

/// Datagram transport; every record is sent as its own UDP packet.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

struct UdpConnection(UdpSocket);

#[async_trait]
impl Transport for UdpTransport {
    async fn dial(
        &self,
        address: &str,
        _options: &TransportOptions,
    ) -> io::Result<Box<dyn Connection>> {
        let remote = tokio::net::lookup_host(address).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {address}"),
            )
        })?;
        let local = if remote.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        debug!("udp: connected to {}", remote);
        Ok(Box::new(UdpConnection(socket)))
    }
}

#[async_trait]
impl Connection for UdpConnection {
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf).await
    }
}
