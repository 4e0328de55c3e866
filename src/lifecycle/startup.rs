//! Startup orchestration.
//!
//! The order is fixed: config, server, registration, start. Routes are in
//! place before the listener accepts its first connection.

use std::future::Future;
use std::time::Duration;

use crate::config::{ConfigError, ConnectConfig};
use crate::http::{Server, ServerError};
use crate::lifecycle::signals::shutdown_signal;
use crate::rpc::{self, HandlerProvider, ModuleOptions, RegistrationError};

/// Drain deadline applied when the process is asked to stop.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// Error type for process startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("service registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

/// Build, register and start a server. Returns once the listener is bound.
pub async fn start<P>(
    config: ConnectConfig,
    opts: &ModuleOptions,
    provider: P,
) -> Result<Server, StartupError>
where
    P: HandlerProvider,
{
    let mut server = Server::new(config);
    let health = rpc::register(server.mux_mut(), opts, provider.handler()).await?;
    server.attach_health(health);
    server.start().await?;
    Ok(server)
}

/// Start a server and run it until `stop` resolves, then drain it.
pub async fn run_until<P, F>(
    config: ConnectConfig,
    opts: &ModuleOptions,
    provider: P,
    stop: F,
) -> Result<(), StartupError>
where
    P: HandlerProvider,
    F: Future<Output = ()>,
{
    let mut server = start(config, opts, provider).await?;
    stop.await;
    server.stop(SHUTDOWN_TIMEOUT).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve config from the environment and serve until SIGINT/SIGTERM.
pub async fn run<P>(opts: &ModuleOptions, provider: P) -> Result<(), StartupError>
where
    P: HandlerProvider,
{
    let config = ConnectConfig::from_env()?;
    tracing::info!(address = %config.address(), "Configuration loaded");
    run_until(config, opts, provider, shutdown_signal()).await
}
