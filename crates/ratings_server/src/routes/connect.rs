//! Terminal connection endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AppState;

/// Connect response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the connect routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/connect", post(connect_handler))
}

/// POST /api/connect
///
/// Replaces any existing connection. No retries.
async fn connect_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state
        .with_service(|service| service.connect().map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(format!("Connection task failed: {}", e)));

    match result {
        Ok(()) => {
            info!("Connected to Bloomberg Terminal");
            (
                StatusCode::OK,
                Json(ConnectResponse {
                    success: true,
                    message: Some("Connected to Bloomberg Terminal".to_string()),
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "Connection attempt failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectResponse {
                    success: false,
                    message: None,
                    error: Some(e),
                }),
            )
        }
    }
}
