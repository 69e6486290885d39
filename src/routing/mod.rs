//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request (method, path)
//!     → router.rs (exact lookup)
//!     → Return: Route (or Route::NotFound)
//!     → http::handlers dispatches on the Route
//! ```
//!
//! # Design Decisions
//! - Route table built once, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod router;

pub use router::{Route, Router};
