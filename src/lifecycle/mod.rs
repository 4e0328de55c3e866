//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Build server → Register services → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain connections (deadline) → Return
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: routes are complete before the first accept
//! - Fail fast: config and registration errors stop startup
//! - Shutdown has a deadline: leftovers are abandoned after it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, StartupError, SHUTDOWN_TIMEOUT};
