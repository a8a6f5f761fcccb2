//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! StagedUpload + UploadMetadata
//!     → client.rs (rebuild multipart form, one part named "file")
//!     → POST <base_url>/ocr/extract (bounded timeout, no retries)
//!     → GatewayOutcome (Success / UpstreamError / TransportError)
//! ```
//!
//! # Design Decisions
//! - A single forwarding attempt per upload; the relay owns the decision
//!   never to retry, so a transient backend failure surfaces immediately
//! - The outgoing body carries no artificial size cap; the relay already
//!   enforced the upload limit

pub mod client;

pub use client::{ForwardingClient, EXTRACT_PATH};
