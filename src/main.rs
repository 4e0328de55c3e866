//! Chomp RPC Gateway (v1beta1)
//!
//! Serves `chomp.v1beta1.ChompService` over HTTP/2 (h2c) and HTTP/1.1,
//! translating each call into one request against the Chomp REST API.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 RPC GATEWAY                  │
//!                         │                                              │
//!     RPC Client          │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!     ────────────────────┼─▶│   net   │──▶│   http   │──▶│    mux    │  │
//!                         │  │listener │   │h2c + cors│   │  (routes) │  │
//!                         │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                         │                                     │        │
//!                         │        ┌────────────┬───────────────┤        │
//!                         │        ▼            ▼               ▼        │
//!                         │  ┌──────────┐ ┌────────────┐ ┌────────────┐  │
//!                         │  │  health  │ │ reflection │ │   chomp    │──┼──▶ Chomp
//!                         │  │   (rpc)  │ │ v1/v1alpha │ │  service   │  │    REST API
//!                         │  └──────────┘ └────────────┘ └────────────┘  │
//!                         │                                              │
//!                         │  config · lifecycle · observability          │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! # Environment
//! - `GRPC_CONNECT_PORT` (required), `GRPC_CONNECT_HOST` (default `localhost`)
//! - `CHOMP_API_BASE_URL` (default `https://chompthis.com/api/v2`)
//! - `RUST_LOG`, `LOG_FORMAT` (`pretty` | `json`)

use chomp_gateway::chomp::{self, ChompClient, ChompGateway};
use chomp_gateway::config::UpstreamConfig;
use chomp_gateway::lifecycle::startup;
use chomp_gateway::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_from_env()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "chomp-gateway starting");

    let upstream = UpstreamConfig::from_env()?;
    tracing::info!(base_url = %upstream.base_url, "Upstream configured");

    let gateway = ChompGateway::new(ChompClient::new(upstream));
    startup::run(&chomp::module_options(), gateway).await?;

    Ok(())
}
