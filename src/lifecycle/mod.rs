//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Open song store → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     stop() → Stop accepting → Abort in-flight workers → Listener closed
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop()
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listener
//! - Stop does not wait for in-flight requests to finish

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
