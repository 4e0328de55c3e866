//! Configuration loading from the environment.

use config::{Config, Environment, Map};

use crate::config::schema::{ConnectConfig, UpstreamConfig, DEFAULT_HOST, DEFAULT_UPSTREAM_BASE_URL};

/// Prefix of the listener variables (`GRPC_CONNECT_HOST`, `GRPC_CONNECT_PORT`).
pub const CONNECT_ENV_PREFIX: &str = "GRPC_CONNECT";

/// Prefix of the upstream variables (`CHOMP_API_BASE_URL`).
pub const UPSTREAM_ENV_PREFIX: &str = "CHOMP_API";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GRPC_CONNECT_PORT is required")]
    MissingPort,

    #[error("GRPC_CONNECT_PORT must be an integer port, got {value:?}")]
    InvalidPort { value: String },

    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

impl ConnectConfig {
    /// Resolve the listener config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_connect(None)
    }

    /// Resolve the listener config from an explicit set of variables.
    ///
    /// Keys use the same names as the process environment, e.g.
    /// `GRPC_CONNECT_PORT`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        load_connect(Some(collect(vars)))
    }
}

impl UpstreamConfig {
    /// Resolve the upstream config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_upstream(None)
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        load_upstream(Some(collect(vars)))
    }
}

fn collect<I, K, V>(vars: I) -> Map<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn environment(prefix: &str, vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(prefix)
        .ignore_empty(true)
        .source(vars)
}

fn load_connect(vars: Option<Map<String, String>>) -> Result<ConnectConfig, ConfigError> {
    let settings = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .add_source(environment(CONNECT_ENV_PREFIX, vars))
        .build()?;

    let host = settings.get_string("host")?;
    let raw_port = match settings.get_string("port") {
        Ok(value) => value,
        Err(config::ConfigError::NotFound(_)) => return Err(ConfigError::MissingPort),
        Err(e) => return Err(e.into()),
    };
    let port = raw_port
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort { value: raw_port.clone() })?;

    Ok(ConnectConfig { host, port })
}

fn load_upstream(vars: Option<Map<String, String>>) -> Result<UpstreamConfig, ConfigError> {
    let settings = Config::builder()
        .set_default("base_url", DEFAULT_UPSTREAM_BASE_URL)?
        .add_source(environment(UPSTREAM_ENV_PREFIX, vars))
        .build()?;

    Ok(UpstreamConfig {
        base_url: settings.get_string("base_url")?,
    })
}
