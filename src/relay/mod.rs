//! Upload relay subsystem.
//!
//! # Data Flow
//! ```text
//! POST /ocr/extract (multipart)
//!     → handler.rs (validate file part, enforce size cap)
//!     → staging.rs (buffer in memory or spool to temp file)
//!     → forward::client (single outbound attempt)
//!     → GatewayOutcome (staged bytes released on return)
//! ```
//!
//! # Design Decisions
//! - Per request: Received → Validated → Staged → Forwarding → Completed,
//!   with Completed reachable from any state via an error path
//! - At most one forwarding attempt per inbound request
//! - Staged bytes are owned by the handling flow and released when the
//!   staged handle drops, so cancellation and panics release them too

pub mod handler;
pub mod staging;

pub use handler::{handle, UploadMetadata, FILE_FIELD};
pub use staging::{StagedUpload, StagingBuffer};
