//! Route modules for the ratings server
//!
//! This module contains endpoint group-specific routers:
//! - health: liveness and connection status
//! - connect: explicit terminal connection
//! - bonds: bond list and single-bond lookup

pub mod bonds;
pub mod connect;
pub mod health;

use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use ratings_core::BondService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Connection owner and bond pipeline
    pub service: Arc<BondService>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>, service: Arc<BondService>) -> Self {
        Self { config, service }
    }

    /// Run blocking vendor work against the service on the blocking pool
    pub async fn with_service<T, F>(&self, work: F) -> Result<T, JoinError>
    where
        F: FnOnce(&BondService) -> T + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || work(&service)).await
    }
}

/// Plain error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Local wall-clock time in ISO-8601 form
pub fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Build the main application router by merging all route modules
pub fn build_router(config: Arc<ServerConfig>, service: Arc<BondService>) -> Router {
    let state = AppState::new(config, service);

    Router::new()
        .merge(health::routes())
        .merge(connect::routes())
        .merge(bonds::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ratings_core::StaticDataSource;
    use tower::ServiceExt;

    fn router() -> Router {
        let state = state_with(ServerConfig::default(), StaticDataSource::new());
        build_router(state.config, state.service)
    }

    #[tokio::test]
    async fn test_router_merges_all_route_groups() {
        let router = router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/connect")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::builder().uri("/api/bonds").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/unknown/path")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_timestamp_is_iso_local() {
        let ts = timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[tokio::test]
    async fn test_with_service_runs_on_blocking_pool() {
        let state = state_with(ServerConfig::default(), StaticDataSource::new());
        let connected = state.with_service(|service| service.is_connected()).await.unwrap();
        assert!(!connected);
    }
}
