//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Library code emits tracing events and spans:
//!     → per-connection span (http::server)
//!     → per-request span (tower-http TraceLayer, gRPC classifier)
//!     → per-RPC span (chomp::service)
//!
//! The binary installs one subscriber (logging.rs) at startup.
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated messages
//! - Pretty output for development, JSON for log shipping
//! - Filter from RUST_LOG, with a crate-scoped default

pub mod logging;

pub use logging::{init, init_from_env, LogFormat};
