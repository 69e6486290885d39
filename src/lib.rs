//! LAN companion server for a performing musician.
//!
//! The audience opens a page served from the performer's machine, reads the
//! lyrics of the song being played, votes for the next one and sends
//! reaction pings. The performer drives the session through [`BardServer`]
//! and the shared [`Session`].

pub mod config;
pub mod console;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod session;
pub mod store;

pub use config::schema::ServerConfig;
pub use http::{BardServer, ServerError};
pub use lifecycle::Shutdown;
pub use session::Session;
pub use store::{MemorySongStore, Song, SongStore};
