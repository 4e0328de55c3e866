//! RPC server lifecycle.
//!
//! # Responsibilities
//! - Own the listener and the multiplexer the registrar fills
//! - Serve HTTP/1.1 and cleartext HTTP/2 (h2c) on one port
//! - Start in the background without blocking the caller
//! - Stop gracefully within a caller-supplied deadline
//!
//! # Lifecycle
//! ```text
//! Server::new(config)        mux empty, nothing bound
//!     → mux_mut() / registrar   routes added
//!     → start()                 bind, freeze routes, spawn accept loop
//!     → stop(deadline)          stop accepting, drain, abort leftovers
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::response::Response;
use axum::{BoxError, Router};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tonic::Status;
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tracing::Instrument;

use crate::config::ConnectConfig;
use crate::http::cors::cors_layer;
use crate::http::mux::ServeMux;
use crate::lifecycle::Shutdown;
use crate::net::{Accept, ConnectionTracker, Listener, ListenerError};
use crate::rpc::ServiceHealth;

/// Time allowed for a client to send the request headers (HTTP/1).
pub const READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);

/// Time allowed for one request/response exchange, upstream call included.
/// Exceeding it answers `DEADLINE_EXCEEDED`.
pub const READ_WRITE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound on request header bytes.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Error type for server lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server is already running")]
    AlreadyStarted,

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("shutdown deadline exceeded with {abandoned} connection(s) still open")]
    DrainDeadline { abandoned: u64 },
}

/// State held while the accept loop runs.
struct Running {
    shutdown: Shutdown,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// The RPC server: a listener plus the multiplexer it serves.
pub struct Server {
    config: ConnectConfig,
    mux: ServeMux,
    health: Option<ServiceHealth>,
    connections: ConnectionTracker,
    running: Option<Running>,
}

impl Server {
    /// Create a server for `config`. No routes, nothing bound.
    pub fn new(config: ConnectConfig) -> Self {
        Self {
            config,
            mux: ServeMux::new(),
            health: None,
            connections: ConnectionTracker::new(),
            running: None,
        }
    }

    /// The route table. Changes made after `start` apply from the next start.
    pub fn mux_mut(&mut self) -> &mut ServeMux {
        &mut self.mux
    }

    /// Attach the readiness handle flipped when the server stops serving.
    pub fn attach_health(&mut self, health: ServiceHealth) {
        self.health = Some(health);
    }

    /// Address actually bound, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Number of client connections currently open.
    pub fn open_connections(&self) -> u64 {
        self.connections.active_count()
    }

    /// Bind the listener and start serving in the background.
    ///
    /// Bind failures (including a port already in use) are returned. Failures
    /// of the accept loop after a successful bind are logged and reported
    /// through the attached [`ServiceHealth`] instead.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let listener = Listener::bind(&self.config.address()).await?;
        let local_addr = listener.local_addr();
        self.launch(listener, local_addr).await;
        Ok(local_addr)
    }

    /// Spawn the accept loop over `acceptor` and record the running state.
    async fn launch<A: Accept>(&mut self, acceptor: A, local_addr: SocketAddr) {
        // A previous stop left health NOT_SERVING.
        if let Some(health) = self.health.as_ref().filter(|h| !h.is_serving()) {
            health.set_serving().await;
        }

        let app = build_app(self.mux.clone(), READ_WRITE_TIMEOUT);
        let shutdown = Shutdown::new();
        let task = tokio::spawn(serve(
            acceptor,
            app,
            shutdown.subscribe(),
            self.health.clone(),
            self.connections.clone(),
        ));

        tracing::info!(
            address = %local_addr,
            routes = ?self.mux.patterns(),
            "Listening for RPC traffic"
        );

        self.running = Some(Running {
            shutdown,
            task,
            local_addr,
        });
    }

    /// Stop accepting connections and drain in-flight ones.
    ///
    /// Connections still open when `deadline` expires are aborted and
    /// [`ServerError::DrainDeadline`] is returned. Stopping a server that is
    /// not running returns immediately.
    pub async fn stop(&mut self, deadline: Duration) -> Result<(), ServerError> {
        let Some(running) = self.running.take() else {
            tracing::debug!("Stop requested for a server that is not running");
            return Ok(());
        };

        if let Some(health) = &self.health {
            health.set_not_serving().await;
        }

        tracing::info!(
            address = %running.local_addr,
            open_connections = self.connections.active_count(),
            deadline_ms = deadline.as_millis() as u64,
            "RPC server shutting down"
        );
        running.shutdown.trigger();

        let mut task = running.task;
        match tokio::time::timeout(deadline, &mut task).await {
            Ok(Ok(())) => {
                tracing::info!("RPC server stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "RPC serve task ended abnormally");
                Ok(())
            }
            Err(_) => {
                let abandoned = self.connections.active_count();
                task.abort();
                let _ = task.await;
                tracing::warn!(abandoned, "Shutdown deadline exceeded, in-flight requests abandoned");
                Err(ServerError::DrainDeadline { abandoned })
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("mux", &self.mux)
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

/// Wrap the frozen route table in the request middleware chain.
fn build_app(mux: ServeMux, request_timeout: Duration) -> Router {
    mux.into_router()
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(timeout_status))
                .timeout(request_timeout),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_grpc())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Answer a request that outlived the server deadline with a gRPC status.
async fn timeout_status(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        Status::deadline_exceeded("request exceeded the server deadline").into_http()
    } else {
        Status::internal(err.to_string()).into_http()
    }
}

fn connection_builder() -> auto::Builder<TokioExecutor> {
    let mut builder = auto::Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(READ_HEADER_TIMEOUT)
        .max_buf_size(MAX_HEADER_BYTES);
    builder
        .http2()
        .timer(TokioTimer::new())
        .max_header_list_size(MAX_HEADER_BYTES as u32);
    builder
}

/// Accept loop. Runs until shutdown is broadcast, then drains.
async fn serve<A: Accept>(
    listener: A,
    app: Router,
    mut shutdown: broadcast::Receiver<()>,
    health: Option<ServiceHealth>,
    connections: ConnectionTracker,
) {
    let builder = connection_builder();
    let graceful = GracefulShutdown::new();
    let service = TowerToHyperService::new(app);
    let mut tasks = JoinSet::new();

    let listener_failed = loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    let guard = connections.track();
                    let span = tracing::debug_span!(
                        "connection",
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr,
                    );
                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service.clone());
                    let conn = graceful.watch(conn.into_owned());
                    tasks.spawn(
                        async move {
                            let _guard = guard;
                            if let Err(e) = conn.await {
                                tracing::debug!(error = %e, "Connection ended with error");
                            }
                        }
                        .instrument(span),
                    );
                }
                Err(e) if e.is_transient() => {
                    tracing::debug!(error = %e, "Dropped connection during accept");
                }
                Err(e) => {
                    tracing::error!(error = %e, "RPC listener failed, no longer accepting connections");
                    break true;
                }
            },
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            _ = shutdown.recv() => break false,
        }
    };
    drop(listener);

    if listener_failed {
        if let Some(health) = &health {
            health.set_not_serving().await;
        }
        // Keep existing connections until the owner stops the server.
        let _ = shutdown.recv().await;
    }

    graceful.shutdown().await;
    tracing::debug!("All connections drained");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> ConnectConfig {
        ConnectConfig::new("127.0.0.1", 0)
    }

    #[tokio::test]
    async fn stop_before_start_is_a_no_op() {
        let mut server = Server::new(local());
        assert!(!server.is_running());
        server.stop(Duration::from_secs(1)).await.unwrap();
        server.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn start_twice_on_one_server_is_rejected() {
        let mut server = Server::new(local());
        let addr = server.start().await.unwrap();
        assert_eq!(server.local_addr(), Some(addr));

        let err = server.start().await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyStarted));

        server.stop(Duration::from_secs(5)).await.unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn second_server_on_same_port_fails_to_bind() {
        let mut first = Server::new(local());
        let addr = first.start().await.unwrap();

        let mut second = Server::new(ConnectConfig::new("127.0.0.1", addr.port()));
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, ServerError::Listener(ListenerError::AddrInUse { .. })));
        assert!(!second.is_running());

        first.stop(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn restart_after_stop_binds_again() {
        let mut server = Server::new(local());
        server.start().await.unwrap();
        server.stop(Duration::from_secs(5)).await.unwrap();

        server.start().await.unwrap();
        assert!(server.is_running());
        server.stop(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn stop_aborts_requests_past_the_deadline() {
        use crate::http::mux::boxed;
        use axum::body::Body;
        use axum::http::{Request, Response};
        use tokio::io::AsyncWriteExt;

        let mut server = Server::new(local());
        let slow = tower::service_fn(|_req: Request<Body>| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        });
        server.mux_mut().handle("/slow", boxed(slow)).unwrap();
        let addr = server.start().await.unwrap();

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(server.open_connections(), 1);

        let err = server.stop(Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, ServerError::DrainDeadline { abandoned: 1 }));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(server.open_connections(), 0);
    }

    /// Accepts from a real listener until told to fail.
    struct FailOnDemand {
        inner: Listener,
        fail: std::sync::Arc<tokio::sync::Notify>,
    }

    impl Accept for FailOnDemand {
        fn accept(
            &self,
        ) -> impl std::future::Future<
            Output = Result<(tokio::net::TcpStream, SocketAddr), ListenerError>,
        > + Send {
            async move {
                tokio::select! {
                    accepted = self.inner.accept() => accepted,
                    _ = self.fail.notified() => Err(ListenerError::Accept(
                        std::io::Error::other("listener torn down"),
                    )),
                }
            }
        }
    }

    async fn check(
        client: &mut tonic_health::pb::health_client::HealthClient<tonic::transport::Channel>,
        service: &str,
    ) -> i32 {
        client
            .check(tonic_health::pb::HealthCheckRequest {
                service: service.to_string(),
            })
            .await
            .unwrap()
            .into_inner()
            .status
    }

    #[tokio::test]
    async fn listener_failure_marks_health_not_serving_until_stop() {
        use crate::http::mux::boxed;
        use crate::rpc::{HandlerOutput, ModuleOptions};
        use axum::body::Body;
        use tonic_health::pb::health_check_response::ServingStatus;
        use tonic_health::pb::health_client::HealthClient;

        const NAME: &str = "chomp.v1beta1.ChompService";
        let mut server = Server::new(local());
        let business = tower::service_fn(|_req: axum::http::Request<Body>| async {
            Ok::<_, std::convert::Infallible>(axum::http::Response::new(Body::empty()))
        });
        let health = crate::rpc::register(
            server.mux_mut(),
            &ModuleOptions::new(NAME, crate::chomp::proto::FILE_DESCRIPTOR_SET),
            HandlerOutput::new(format!("/{NAME}/"), boxed(business)),
        )
        .await
        .unwrap();
        server.attach_health(health.clone());

        let inner = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = inner.local_addr();
        let fail = std::sync::Arc::new(tokio::sync::Notify::new());
        server
            .launch(
                FailOnDemand {
                    inner,
                    fail: fail.clone(),
                },
                addr,
            )
            .await;

        let channel = tonic::transport::Channel::from_shared(format!("http://{addr}"))
            .unwrap()
            .connect()
            .await
            .unwrap();
        let mut client = HealthClient::new(channel);
        assert_eq!(check(&mut client, "").await, ServingStatus::Serving as i32);
        assert_eq!(check(&mut client, NAME).await, ServingStatus::Serving as i32);

        fail.notify_one();

        // The open connection keeps answering while the server is degraded.
        tokio::time::timeout(Duration::from_secs(2), async {
            while check(&mut client, NAME).await != ServingStatus::NotServing as i32 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(check(&mut client, "").await, ServingStatus::NotServing as i32);
        assert!(!health.is_serving());
        assert!(server.is_running());

        drop(client);
        server.stop(Duration::from_secs(5)).await.unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn request_past_the_timeout_gets_deadline_exceeded() {
        use crate::http::mux::boxed;
        use axum::body::Body;
        use tower::ServiceExt;

        let mut mux = ServeMux::new();
        let slow = tower::service_fn(|_req: axum::http::Request<Body>| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, std::convert::Infallible>(axum::http::Response::new(Body::empty()))
        });
        mux.handle("/slow", boxed(slow)).unwrap();

        let response = build_app(mux, Duration::from_millis(50))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/slow")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["grpc-status"], "4");
    }
}
