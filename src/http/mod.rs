//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper-util auto builder: HTTP/1.1 or h2c prior knowledge)
//!     → request id → trace → cors.rs → request timeout
//!     → mux.rs (path prefix → registered RPC service)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - The mux is filled before `Server::start`; start freezes a copy of it
//! - HTTP/1 and HTTP/2 share one port so gRPC and CORS preflights both work
//! - Timeouts and header limits are fixed constants, not configuration

pub mod cors;
pub mod mux;
pub mod server;

pub use mux::{BoxedHandler, MuxError, ServeMux};
pub use server::{Server, ServerError};
