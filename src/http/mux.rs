//! Path multiplexer shared by every registered RPC endpoint.
//!
//! A pattern ending in `/` owns itself and every path below it, which is how
//! gRPC services are mounted (`/pkg.Service/` → `/pkg.Service/Method`). The
//! more specific pattern wins, so `/` only sees what nothing else claims. Any
//! other pattern matches exactly. Unmatched paths get `404 Not Found`.

use std::convert::Infallible;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{Request, Response};
use axum::{BoxError, Router};
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceExt};

/// A type-erased request handler mounted on the mux.
pub type BoxedHandler = BoxCloneSyncService<Request<Body>, Response<Body>, Infallible>;

/// Error type for route registration.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error("pattern {0:?} must be a literal path starting with '/'")]
    InvalidPattern(String),

    #[error("a handler is already registered for {0:?}")]
    Conflict(String),
}

/// Erase a tower service into a [`BoxedHandler`].
pub fn boxed<S, B>(service: S) -> BoxedHandler
where
    S: Service<Request<Body>, Response = Response<B>, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    BoxCloneSyncService::new(service.map_response(|response| response.map(Body::new)))
}

fn validate(pattern: &str) -> Result<(), MuxError> {
    let literal = pattern.starts_with('/')
        && !pattern.contains(['{', '}', '*'])
        && !pattern.split('/').any(|segment| segment.starts_with(':'));
    if literal {
        Ok(())
    } else {
        Err(MuxError::InvalidPattern(pattern.to_string()))
    }
}

/// Route table from path patterns to handlers.
#[derive(Clone, Default)]
pub struct ServeMux {
    router: Router,
    patterns: Vec<String>,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`.
    ///
    /// Patterns are literal paths; route parameters and wildcards are
    /// rejected.
    pub fn handle(&mut self, pattern: &str, handler: BoxedHandler) -> Result<(), MuxError> {
        validate(pattern)?;
        if self.patterns.iter().any(|p| p == pattern) {
            return Err(MuxError::Conflict(pattern.to_string()));
        }
        let router = std::mem::take(&mut self.router);
        self.router = if pattern == "/" {
            router.fallback_service(handler)
        } else if pattern.ends_with('/') {
            router
                .route_service(pattern, handler.clone())
                .route_service(&format!("{pattern}{{*rest}}"), handler)
        } else {
            router.route_service(pattern, handler)
        };
        self.patterns.push(pattern.to_string());
        tracing::debug!(pattern, "Route registered");
        Ok(())
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Freeze the table into a router.
    pub fn into_router(self) -> Router {
        self.router
    }
}

impl std::fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeMux")
            .field("patterns", &self.patterns)
            .finish()
    }
}
