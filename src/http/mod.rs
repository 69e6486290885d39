//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one worker slot)
//!     → request.rs (request line, drain headers, request ID)
//!     → routing layer resolves the path to a Route
//!     → handlers.rs (session / store → Response)
//!     → response.rs (status line, headers, body)
//!     → write, close
//! ```

pub mod handlers;
pub mod page;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use request::{Request, RequestId, X_REQUEST_ID};
pub use response::{Outcome, Response, Status};
pub use server::{BardServer, ServerError};
