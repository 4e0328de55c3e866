//! RPC service registration subsystem.
//!
//! # Data Flow
//! ```text
//! ModuleOptions + HandlerProvider::handler()
//!     → registrar.rs (validate options, build health + reflection)
//!     → ServeMux: /grpc.health.v1.Health/
//!                 /grpc.reflection.v1.ServerReflection/
//!                 /grpc.reflection.v1alpha.ServerReflection/
//!                 HandlerOutput::path (business service)
//!     → ServiceHealth handed to the server for degraded-state reporting
//! ```
//!
//! # Design Decisions
//! - Registration completes before `Server::start`; ordering, not locking
//! - Invalid options fail before any route is mounted
//! - The business service is supplied through a typed provider trait

pub mod health;
pub mod options;
pub mod registrar;

pub use health::{ServiceHealth, OVERALL};
pub use options::{HandlerOutput, HandlerProvider, ModuleOptions};
pub use registrar::{register, RegistrationError};
