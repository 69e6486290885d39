//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (worker slot, accept)
//!     → connection.rs (id, in-flight tracking)
//!     → Hand off to HTTP layer
//!
//! interfaces.rs: local IPv4 for display only
//! ```
//!
//! # Design Decisions
//! - A worker slot is taken before accept, so bursts queue in the backlog
//! - Each connection is tracked until its worker finishes or is aborted

pub mod connection;
pub mod interfaces;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError, WorkerPermit};
