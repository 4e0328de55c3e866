//! Populates the multiplexer with health, reflection and business routes.

use std::convert::Infallible;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{Request, Response};
use axum::BoxError;
use tonic::codec::CompressionEncoding;
use tonic::server::NamedService;
use tower::Service;

use crate::http::mux::{boxed, MuxError, ServeMux};
use crate::rpc::health::ServiceHealth;
use crate::rpc::options::{HandlerOutput, ModuleOptions};

/// Error type for service registration. All variants are startup-time.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("at least one service name is required for health checks")]
    NoServices,

    #[error("health service names must not be empty")]
    EmptyServiceEntry,

    #[error("a service name is required for reflection")]
    MissingServiceName,

    #[error("reflection service {name:?} is not among the health-checked services")]
    ServiceNameNotListed { name: String },

    #[error("failed to build reflection service: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    #[error(transparent)]
    Route(#[from] MuxError),
}

impl ModuleOptions {
    /// Check the preconditions of [`register`].
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.services.is_empty() {
            return Err(RegistrationError::NoServices);
        }
        if self.services.iter().any(|s| s.trim().is_empty()) {
            return Err(RegistrationError::EmptyServiceEntry);
        }
        if self.service_name.trim().is_empty() {
            return Err(RegistrationError::MissingServiceName);
        }
        if !self.services.contains(&self.service_name) {
            return Err(RegistrationError::ServiceNameNotListed {
                name: self.service_name.clone(),
            });
        }
        Ok(())
    }
}

/// Mount the health endpoint, both reflection generations and `handler`.
///
/// Every configured service starts out SERVING. Nothing is mounted when the
/// options are invalid or a reflection service cannot be built.
pub async fn register(
    mux: &mut ServeMux,
    opts: &ModuleOptions,
    handler: HandlerOutput,
) -> Result<ServiceHealth, RegistrationError> {
    opts.validate()?;

    let reflection_v1 = reflection_builder(opts)
        .build_v1()?
        .accept_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Gzip);
    let reflection_v1alpha = reflection_builder(opts)
        .build_v1alpha()?
        .accept_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Gzip);

    let (reporter, health_service) = tonic_health::server::health_reporter();
    let health = ServiceHealth::new(reporter, opts.services.clone());

    // Stage on a copy so a route conflict leaves the caller's mux untouched.
    let mut staged = mux.clone();
    mount(&mut staged, health_service)?;
    mount(&mut staged, reflection_v1)?;
    mount(&mut staged, reflection_v1alpha)?;
    staged.handle(&handler.path, handler.handler)?;
    *mux = staged;

    health.set_serving().await;

    tracing::info!(
        service = %opts.service_name,
        path = %handler.path,
        health_services = ?opts.services,
        "RPC services registered"
    );
    Ok(health)
}

fn reflection_builder(opts: &ModuleOptions) -> tonic_reflection::server::Builder<'static> {
    tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(opts.file_descriptor_set)
        .with_service_name(opts.service_name.clone())
}

fn mount<S, B>(mux: &mut ServeMux, service: S) -> Result<(), MuxError>
where
    S: NamedService
        + Service<Request<Body>, Response = Response<B>, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    mux.handle(&format!("/{}/", S::NAME), boxed(service))
}
