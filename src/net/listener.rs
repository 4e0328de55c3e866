//! TCP listener for the RPC server.
//!
//! # Responsibilities
//! - Bind to the configured `host:port`
//! - Report "address in use" distinctly from other bind failures
//! - Accept incoming TCP connections

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

/// Source of inbound connections for the server's accept loop.
pub(crate) trait Accept: Send + Sync + 'static {
    fn accept(
        &self,
    ) -> impl Future<Output = Result<(TcpStream, SocketAddr), ListenerError>> + Send;
}

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Another socket already listens on the address.
    #[error("address {addr} is already in use")]
    AddrInUse { addr: String },

    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Failed to accept connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] io::Error),
}

impl ListenerError {
    /// True for errors that only affect the connection being accepted.
    pub fn is_transient(&self) -> bool {
        match self {
            ListenerError::Accept(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

/// A bound TCP listener.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `addr`, which may name a host (`localhost:8080`) or an IP.
    pub async fn bind(addr: &str) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            if source.kind() == io::ErrorKind::AddrInUse {
                ListenerError::AddrInUse {
                    addr: addr.to_string(),
                }
            } else {
                ListenerError::Bind {
                    addr: addr.to_string(),
                    source,
                }
            }
        })?;

        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        tracing::debug!(address = %local_addr, "Listener bound");

        Ok(Self {
            inner: listener,
            local_addr,
        })
    }

    /// Accept a new connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::trace!(peer_addr = %addr, "Connection accepted");
        Ok((stream, addr))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Accept for Listener {
    fn accept(
        &self,
    ) -> impl Future<Output = Result<(TcpStream, SocketAddr), ListenerError>> + Send {
        Listener::accept(self)
    }
}
