//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routes, middleware)
//!     → request.rs (request ID generation and propagation)
//!     → [relay stages the upload, forward sends it upstream]
//!     → response.rs (outcome → status code + body mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeGatewayRequestId, X_REQUEST_ID};
pub use response::{GatewayOutcome, TransportKind};
pub use server::{AppState, HttpServer};
