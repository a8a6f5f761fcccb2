//! Document-Ingestion Gateway
//!
//! An HTTP relay that accepts a single uploaded file (PDF or image),
//! stages it, forwards it as a multipart request to the OCR/NLP backend,
//! and passes the backend's JSON response back to the caller.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client upload              ┌───────────────────────────────────────┐
//!     ──────────────────────────▶│  http    │   relay     │   forward    │
//!     POST /ocr/extract          │  server ─▶│  handler ──▶│   client ───┼──▶ OCR/NLP
//!                                │          │  + staging  │   (reqwest)  │    backend
//!     Client response            │          │             │              │
//!     ◀──────────────────────────┼─ response ◀── outcome ◀───────────────┼──◀
//!                                │   mapping                             │
//!                                │  ┌─────────────────────────────────┐  │
//!                                │  │      Cross-Cutting Concerns     │  │
//!                                │  │  config │ observability │ life- │  │
//!                                │  │         │ (logs+metrics)│ cycle │  │
//!                                │  └─────────────────────────────────┘  │
//!                                └───────────────────────────────────────┘
//! ```
//!
//! Every accepted upload produces exactly one response, and its staged
//! bytes (buffer or temp file) are released before the handling flow
//! returns, on success and on every failure path.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// Service name reported by the `/health` endpoint.
pub const SERVICE_NAME: &str = "ocr-gateway";
