//! Registration inputs: module options and the business handler.

use std::convert::Infallible;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{Request, Response};
use axum::BoxError;
use tonic::server::NamedService;
use tower::Service;

use crate::http::mux::{boxed, BoxedHandler};

/// What the registrar needs to know about the hosted RPC service.
#[derive(Debug, Clone)]
pub struct ModuleOptions {
    /// Fully-qualified service name served by reflection.
    pub service_name: String,

    /// Fully-qualified service names reported SERVING by the health endpoint.
    pub services: Vec<String>,

    /// Encoded `FileDescriptorSet` describing `service_name`.
    pub file_descriptor_set: &'static [u8],
}

impl ModuleOptions {
    pub fn new(service_name: impl Into<String>, file_descriptor_set: &'static [u8]) -> Self {
        let service_name = service_name.into();
        Self {
            services: vec![service_name.clone()],
            service_name,
            file_descriptor_set,
        }
    }

    /// Replace the list of names reported by the health endpoint.
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = services.into_iter().map(Into::into).collect();
        self
    }
}

/// The route and handler of one business RPC service.
pub struct HandlerOutput {
    /// Mux pattern, normally `/<fully.qualified.Service>/`.
    pub path: String,
    pub handler: BoxedHandler,
}

impl HandlerOutput {
    pub fn new(path: impl Into<String>, handler: BoxedHandler) -> Self {
        Self {
            path: path.into(),
            handler,
        }
    }

    /// Mount a generated tonic server under `/<S::NAME>/`.
    pub fn from_service<S, B>(service: S) -> Self
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
        Self::new(format!("/{}/", S::NAME), boxed(service))
    }
}

impl std::fmt::Debug for HandlerOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerOutput")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Produces the route and handler for one business service.
pub trait HandlerProvider {
    fn handler(self) -> HandlerOutput;
}

impl<F> HandlerProvider for F
where
    F: FnOnce() -> HandlerOutput,
{
    fn handler(self) -> HandlerOutput {
        self()
    }
}
