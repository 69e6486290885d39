//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use bard_server::store::{MemorySongStore, Song, SongId};
use bard_server::{BardServer, ServerConfig};

pub fn song(id: SongId, author: &str, name: &str) -> Song {
    Song {
        id,
        author: author.to_string(),
        name: name.to_string(),
        lyrics: format!("{name}\nla la la"),
    }
}

/// The two-song catalogue used throughout the endpoint tests.
pub fn sample_store() -> Arc<MemorySongStore> {
    Arc::new(MemorySongStore::with_songs([
        song(1, "Oasis", "Wonderwall"),
        song(2, "Nirvana", "Come as you are"),
    ]))
}

/// Default configuration bound to an ephemeral loopback port.
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start a server over the sample catalogue.
pub async fn start_server() -> (BardServer, SocketAddr) {
    let mut server = BardServer::new(local_config(), sample_store());
    let addr = server.start().await.unwrap();
    (server, addr)
}

/// Write raw bytes and read until the server closes the connection.
pub async fn send_raw(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

/// Send a bare `GET` and return the raw response.
pub async fn get_raw(addr: SocketAddr, target: &str) -> String {
    send_raw(addr, &format!("GET {target} HTTP/1.1\r\nHost: test\r\n\r\n")).await
}

/// Split a raw response into head and body.
pub fn split_response(raw: &str) -> (&str, &str) {
    raw.split_once("\r\n\r\n").unwrap()
}

pub fn url(addr: SocketAddr, target: &str) -> String {
    format!("http://{addr}{target}")
}
