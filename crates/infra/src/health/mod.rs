//! Health endpoint.
//!
//! `GET /health` reports overall status plus the scheduler and
//! AI-enrichment sub-statuses. Overall `error` returns HTTP 503 so
//! platform health checks restart the process.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use parking_lot::RwLock;
use serde::Serialize;
use shoptok_core::MapperStats;
use shoptok_domain::{Result, SyncError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Error,
}

/// Shared, mutable view of process health.
pub struct HealthState {
    scheduler: RwLock<ComponentStatus>,
    mapper_stats: Arc<MapperStats>,
}

impl HealthState {
    pub fn new(mapper_stats: Arc<MapperStats>) -> Self {
        Self { scheduler: RwLock::new(ComponentStatus::Healthy), mapper_stats }
    }

    pub fn set_scheduler(&self, status: ComponentStatus) {
        *self.scheduler.write() = status;
    }

    /// Enrichment health is derived from mapper counters: rejected
    /// credentials are an error, observed fallbacks mean degraded.
    fn enrichment(&self) -> ComponentStatus {
        if self.mapper_stats.auth_failed() {
            ComponentStatus::Error
        } else if self.mapper_stats.fallbacks() > 0 {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let scheduler = *self.scheduler.read();
        let enrichment = self.enrichment();
        let status = if scheduler == ComponentStatus::Error || enrichment == ComponentStatus::Error
        {
            ComponentStatus::Error
        } else if scheduler == ComponentStatus::Degraded
            || enrichment == ComponentStatus::Degraded
        {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        };

        HealthSnapshot {
            status,
            scheduler,
            enrichment,
            products_enriched: self.mapper_stats.enriched(),
            fallback_mappings: self.mapper_stats.fallbacks(),
            cache_hits: self.mapper_stats.cache_hits(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthSnapshot {
    pub status: ComponentStatus,
    pub scheduler: ComponentStatus,
    pub enrichment: ComponentStatus,
    pub products_enriched: u64,
    pub fallback_mappings: u64,
    pub cache_hits: u64,
}

async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let snapshot = state.snapshot();
    let code = match snapshot.status {
        ComponentStatus::Error => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (code, Json(snapshot))
}

pub fn router(state: Arc<HealthState>) -> Router {
    Router::new().route("/health", get(health_handler)).with_state(state)
}

/// Serve the health endpoint until the process exits.
pub async fn serve(state: Arc<HealthState>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| SyncError::Internal(format!("failed to bind health port {port}: {err}")))?;
    info!(%addr, "health endpoint listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|err| SyncError::Internal(format!("health server failed: {err}")))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    async fn call(state: Arc<HealthState>) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn healthy_process_returns_200() {
        let state = Arc::new(HealthState::new(Arc::new(MapperStats::default())));
        let (status, body) = call(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["scheduler"], "healthy");
        assert_eq!(body["enrichment"], "healthy");
    }

    #[tokio::test]
    async fn scheduler_error_returns_503() {
        let state = Arc::new(HealthState::new(Arc::new(MapperStats::default())));
        state.set_scheduler(ComponentStatus::Error);
        let (status, body) = call(state).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
    }
}
