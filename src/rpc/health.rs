//! Readiness handle over the standard gRPC health service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;

/// Health-check name of the server as a whole, queried by generic health checkers.
pub const OVERALL: &str = "";

/// Reports the serving state of every configured service name, plus the
/// overall server entry.
///
/// Cloned into the server so a failed listener can mark the process
/// NOT_SERVING instead of degrading silently.
#[derive(Clone)]
pub struct ServiceHealth {
    reporter: HealthReporter,
    services: Arc<[String]>,
    serving: Arc<AtomicBool>,
}

impl ServiceHealth {
    pub fn new(reporter: HealthReporter, services: impl Into<Arc<[String]>>) -> Self {
        Self {
            reporter,
            services: services.into(),
            serving: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn set_serving(&self) {
        self.set_all(ServingStatus::Serving).await;
        self.serving.store(true, Ordering::SeqCst);
    }

    pub async fn set_not_serving(&self) {
        self.serving.store(false, Ordering::SeqCst);
        self.set_all(ServingStatus::NotServing).await;
        tracing::warn!(services = ?self.services, "Services marked NOT_SERVING");
    }

    /// Last state written through this handle.
    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::SeqCst)
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    async fn set_all(&self, status: ServingStatus) {
        let overall = std::iter::once(OVERALL);
        for service in overall.chain(self.services.iter().map(String::as_str)) {
            self.reporter
                .clone()
                .set_service_status(service, status)
                .await;
        }
    }
}

impl std::fmt::Debug for ServiceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHealth")
            .field("services", &self.services)
            .field("serving", &self.is_serving())
            .finish()
    }
}
