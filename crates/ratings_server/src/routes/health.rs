//! Health check endpoint
//!
//! Reports liveness together with whether the terminal connection is held.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::{timestamp, AppState};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "OK" while the process serves requests
    pub status: String,
    /// Local time of the check
    pub timestamp: String,
    /// Whether a terminal connection is currently held
    pub bloomberg_connected: bool,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_handler))
}

/// GET /api/health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "OK".to_string(),
        timestamp: timestamp(),
        bloomberg_connected: state.service.is_connected(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::routes::test_support::state_with;
    use axum::body::Body;
    use axum::http::Request;
    use ratings_core::StaticDataSource;
    use tower::ServiceExt;

    async fn get_health(state: AppState) -> (StatusCode, HealthResponse) {
        let response = routes()
            .with_state(state)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_disconnected() {
        let state = state_with(ServerConfig::default(), StaticDataSource::new());
        let (status, health) = get_health(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "OK");
        assert!(!health.bloomberg_connected);
        assert!(!health.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_health_reports_connected() {
        let state = state_with(ServerConfig::default(), StaticDataSource::new());
        state.service.connect().unwrap();

        let (_, health) = get_health(state).await;
        assert!(health.bloomberg_connected);
    }
}
