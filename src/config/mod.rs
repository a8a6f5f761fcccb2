//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → loader.rs (env overrides: PORT, OCR_NLP_BASE)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the relay and forwarding client
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; handling logic never reads ambient
//!   environment state
//! - All fields have defaults so the gateway runs with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load;
pub use schema::GatewayConfig;
pub use schema::LimitsConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::StagingStrategy;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
