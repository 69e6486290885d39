//! The embedded audience server.
//!
//! # Responsibilities
//! - Bind the listener on `start()`, release it on `stop()`
//! - Run the accept loop on its own task, one worker task per connection
//! - Serve exactly one request per connection, then close
//! - Expose the performer-side operations (current song, tallies)
//!
//! # Design Decisions
//! - `stop()` does not wait for in-flight requests; workers are aborted
//! - A closed listener during shutdown is expected, not an error
//! - Transient I/O failures abandon the one connection and are logged

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::handlers::{self, AppState};
use crate::http::request::{read_request, RequestError, RequestId, RequestLimits};
use crate::http::response::Response;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::Router;
use crate::session::{ReactionKind, Session};
use crate::store::{Song, SongId, SongStore};

/// Errors surfaced by [`BardServer::start`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server is already running on {0}")]
    AlreadyRunning(SocketAddr),
}

/// Everything a connection worker needs.
struct ConnectionContext {
    state: AppState,
    router: Router,
    limits: RequestLimits,
    io_timeout: Option<Duration>,
}

struct Running {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    accept_task: JoinHandle<()>,
}

/// LAN server for the audience. Owned by the performer side.
///
/// Other parts of the app that need to change the current song are handed
/// [`BardServer::session`], not the server itself.
pub struct BardServer {
    config: ServerConfig,
    state: AppState,
    tracker: ConnectionTracker,
    running: Option<Running>,
}

impl BardServer {
    /// Create a stopped server with a fresh session.
    pub fn new(config: ServerConfig, store: Arc<dyn SongStore>) -> Self {
        Self::with_session(config, store, Arc::new(Session::new()))
    }

    /// Create a stopped server around an existing session.
    pub fn with_session(
        config: ServerConfig,
        store: Arc<dyn SongStore>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            config,
            state: AppState::new(session, store),
            tracker: ConnectionTracker::new(),
            running: None,
        }
    }

    /// Bind the listener and start accepting connections.
    ///
    /// On a bind failure nothing is left running and the error is returned.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if let Some(running) = &self.running {
            return Err(ServerError::AlreadyRunning(running.local_addr));
        }

        let listener = Listener::bind(&self.config.listener).await?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        let context = Arc::new(ConnectionContext {
            state: self.state.clone(),
            router: Router::new(),
            limits: RequestLimits::from(&self.config.listener),
            io_timeout: self.config.timeouts.io_secs.map(Duration::from_secs),
        });

        let shutdown = Shutdown::new();
        let accept_task = tokio::spawn(accept_loop(
            listener,
            context,
            self.tracker.clone(),
            shutdown.subscribe(),
        ));

        tracing::info!(address = %local_addr, "Server started");
        self.running = Some(Running {
            local_addr,
            shutdown,
            accept_task,
        });
        Ok(local_addr)
    }

    /// Stop accepting, close the listener and abort in-flight workers.
    ///
    /// Calling `stop` on a stopped server does nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.shutdown.trigger();
        if let Err(e) = running.accept_task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Accept loop panicked");
            }
        }
        tracing::info!(address = %running.local_addr, "Server stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Address the listener is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    /// Connections currently being served.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Shared session handle.
    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.state.session)
    }

    pub fn store(&self) -> Arc<dyn SongStore> {
        Arc::clone(&self.state.store)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn set_current_song(&self, song: Option<Song>) {
        self.state.session.set_current_song(song);
    }

    pub fn current_song(&self) -> Option<Arc<Song>> {
        self.state.session.current_song()
    }

    pub fn vote_counts_for_display(&self) -> BTreeMap<SongId, u32> {
        self.state.session.vote_counts()
    }

    pub fn reaction_totals_for_display(&self) -> BTreeMap<ReactionKind, u64> {
        self.state.session.reaction_totals()
    }
}

impl Drop for BardServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.trigger();
            running.accept_task.abort();
        }
    }
}

async fn accept_loop(
    listener: Listener,
    context: Arc<ConnectionContext>,
    tracker: ConnectionTracker,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr, permit)) => {
                    let guard = tracker.track();
                    let span = tracing::debug_span!(
                        "connection",
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr,
                    );
                    let context = Arc::clone(&context);
                    workers.spawn(
                        async move {
                            let _permit = permit;
                            let _guard = guard;
                            serve_connection(stream, &context).await;
                        }
                        .instrument(span),
                    );
                }
                Err(ListenerError::Closed) => break,
                Err(e) => tracing::warn!(error = %e, "Accept failed"),
            },

            Some(finished) = workers.join_next(), if !workers.is_empty() => {
                if let Err(e) = finished {
                    if e.is_panic() {
                        tracing::error!(error = %e, "Connection worker panicked");
                    }
                }
            }
        }
    }

    drop(listener);
    let in_flight = workers.len();
    workers.shutdown().await;
    tracing::debug!(aborted = in_flight, "Accept loop exited");
}

async fn serve_connection(mut stream: TcpStream, context: &ConnectionContext) {
    let result = match context.io_timeout {
        Some(limit) => match tokio::time::timeout(limit, exchange(&mut stream, context)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(timeout_secs = limit.as_secs(), "Connection timed out");
                return;
            }
        },
        None => exchange(&mut stream, context).await,
    };

    if let Err(e) = result {
        tracing::warn!(error = %e, "Connection I/O failed");
    }
}

/// Read one request, write one response, close the write side.
async fn exchange(stream: &mut TcpStream, context: &ConnectionContext) -> std::io::Result<()> {
    let start = Instant::now();
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let (route, response) = match read_request(&mut reader, &context.limits).await {
        Ok(Some(request)) => {
            let route = context.router.match_request(&request);
            tracing::debug!(
                request_id = %request.id,
                method = %request.method,
                path = %request.path,
                route = route.name(),
                "Request"
            );
            let response = handlers::handle(&context.state, route, &request).with_request_id(request.id);
            (route.name(), response)
        }
        Ok(None) => return Ok(()),
        Err(RequestError::Io(e)) => return Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed request");
            ("malformed", Response::bad_request().with_request_id(RequestId::new()))
        }
    };

    write_half.write_all(&response.to_bytes()).await?;
    write_half.shutdown().await?;
    metrics::record_request(route, response.status().code(), start);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySongStore;
    use tokio::io::AsyncReadExt;

    fn config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config
    }

    fn server() -> BardServer {
        BardServer::new(config(), Arc::new(MemorySongStore::new()))
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn start_serves_and_stop_is_idempotent() {
        let mut server = server();
        let addr = server.start().await.unwrap();
        assert!(server.is_running());
        assert_eq!(server.local_addr(), Some(addr));

        let raw = roundtrip(addr, "GET /current-song HTTP/1.1\r\n\r\n").await;
        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.ends_with("\r\n\r\nnull"));

        server.stop().await;
        server.stop().await;
        assert!(!server.is_running());
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let mut server = server();
        let addr = server.start().await.unwrap();
        let err = server.start().await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyRunning(a) if a == addr));
        server.stop().await;
    }

    #[tokio::test]
    async fn garbage_request_line_gets_400() {
        let mut server = server();
        let addr = server.start().await.unwrap();
        let raw = roundtrip(addr, "GARBAGE\r\nHost: x\r\n\r\n").await;
        assert!(raw.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(raw.contains("X-Request-Id: "));
        server.stop().await;
    }

    #[tokio::test]
    async fn silent_client_times_out_and_frees_its_slot() {
        let mut config = config();
        config.listener.pool_size = 1;
        config.timeouts.io_secs = Some(1);
        let mut server = BardServer::new(config, Arc::new(MemorySongStore::new()));
        let addr = server.start().await.unwrap();

        let _silent = TcpStream::connect(addr).await.unwrap();
        let raw = roundtrip(addr, "GET /reactions HTTP/1.1\r\n\r\n").await;
        assert!(raw.ends_with("\r\n\r\n{}"));
        server.stop().await;
    }
}
