//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (GRPC_CONNECT_*, CHOMP_API_*)
//!     → loader.rs (config crate Environment source)
//!     → semantic checks (port present, port is a u16)
//!     → ConnectConfig / UpstreamConfig (immutable)
//!     → handed by value to the server and the upstream client
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup; there is no reload
//! - A missing or unparsable port is fatal before anything binds
//! - Resolution from an explicit map exists so tests never touch process env

pub mod loader;
pub mod schema;

pub use loader::ConfigError;
pub use schema::{ConnectConfig, UpstreamConfig};
