//! Chomp food API translation layer.
//!
//! # Data Flow
//! ```text
//! GetFood / ListFoods RPC
//!     → service.rs (api_key header check, request logging)
//!     → client.rs (one GET against the upstream REST API)
//!     → api.rs (upstream JSON document)
//!     → convert.rs (field-by-field mapping into proto::Food)
//!     → response with `api-version: v1beta1`
//! ```
//!
//! # Design Decisions
//! - No retries, caching or cancellation; one upstream call per RPC
//! - The credential is passed through verbatim, never validated
//! - 64-bit upstream integers are narrowed to the proto's int32 fields

pub mod api;
pub mod client;
pub mod convert;
pub mod error;
pub mod proto;
pub mod service;

pub use client::ChompClient;
pub use error::{ServiceError, UpstreamError};
pub use service::ChompGateway;

use crate::rpc::ModuleOptions;

/// Fully-qualified name of the gateway's RPC service.
pub const SERVICE_NAME: &str = proto::chomp_service_server::SERVICE_NAME;

/// Registration options for the Chomp service.
pub fn module_options() -> ModuleOptions {
    ModuleOptions::new(SERVICE_NAME, proto::FILE_DESCRIPTOR_SET)
}
