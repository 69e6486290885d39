//! TCP listener with a bounded worker pool.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce `pool_size` via semaphore: a slot is taken before `accept`
//! - Graceful handling of accept errors

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address (in use, permission denied, bad address).
    #[error("Failed to bind: {0}")]
    Bind(std::io::Error),

    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(std::io::Error),

    /// The worker pool was shut down.
    #[error("Worker pool closed")]
    Closed,
}

/// A TCP listener that hands out at most `pool_size` connections at a time.
///
/// When every slot is taken the listener stops calling `accept`, so a burst of
/// clients waits in the kernel backlog instead of spawning more workers.
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// One permit per worker slot.
    worker_slots: Arc<Semaphore>,
    /// Configured pool size.
    pool_size: usize,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            pool_size = config.pool_size,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            worker_slots: Arc::new(Semaphore::new(config.pool_size)),
            pool_size: config.pool_size,
        })
    }

    /// Accept a new connection once a worker slot is free.
    ///
    /// Returns the stream and a permit that must be held for the connection's lifetime.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, WorkerPermit), ListenerError> {
        // Acquire permit first (backpressure)
        let permit = self
            .worker_slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            free_slots = self.worker_slots.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, WorkerPermit { _permit: permit }))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Worker slots not currently serving a connection.
    pub fn available_slots(&self) -> usize {
        self.worker_slots.available_permits()
    }

    /// Get configured pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }
}

/// A permit representing a worker slot.
///
/// When dropped, the slot is released back to the pool. This holds even if
/// the connection task panics or is aborted.
#[derive(Debug)]
pub struct WorkerPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bind_address: &str, pool_size: usize) -> ListenerConfig {
        ListenerConfig {
            bind_address: bind_address.to_string(),
            pool_size,
            ..ListenerConfig::default()
        }
    }

    #[tokio::test]
    async fn bind_fails_when_port_taken() {
        let first = Listener::bind(&config("127.0.0.1:0", 1)).await.unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let second = Listener::bind(&config(&taken, 1)).await;
        assert!(matches!(second, Err(ListenerError::Bind(_))));
    }

    #[tokio::test]
    async fn bind_rejects_unparseable_address() {
        let result = Listener::bind(&config("not-an-address", 1)).await;
        assert!(matches!(result, Err(ListenerError::Bind(_))));
    }

    #[tokio::test]
    async fn accept_holds_slot_until_permit_dropped() {
        let listener = Listener::bind(&config("127.0.0.1:0", 2)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_eq!(listener.pool_size(), 2);

        let _client = TcpStream::connect(addr).await.unwrap();
        let (_stream, _peer, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_slots(), 1);

        drop(permit);
        assert_eq!(listener.available_slots(), 2);
    }
}
