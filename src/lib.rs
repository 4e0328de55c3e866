//! Chomp RPC Gateway Library
//!
//! Exposes the Chomp branded-food REST API as the `chomp.v1beta1.ChompService`
//! RPC service, next to the standard gRPC health and reflection endpoints.

pub mod chomp;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod rpc;

pub use config::{ConnectConfig, UpstreamConfig};
pub use http::Server;
pub use lifecycle::Shutdown;
pub use rpc::{HandlerOutput, HandlerProvider, ModuleOptions};
