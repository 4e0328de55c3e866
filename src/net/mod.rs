//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ConnectConfig::address()
//!     → listener.rs (bind, classify port-in-use, accept)
//!     → connection.rs (connection id, in-flight tracking)
//!     → Hand off to HTTP layer (hyper-util auto builder)
//! ```
//!
//! # Design Decisions
//! - Bind happens on the caller's task so bind errors reach the caller
//! - Accept errors are split into per-connection (retry) and listener-level (stop)
//! - Each connection is tracked so shutdown can report what it abandons

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub(crate) use listener::Accept;
pub use listener::{Listener, ListenerError};
