//! Bond endpoints
//!
//! `GET /api/bonds` screens, fetches and normalises a list of bonds;
//! `GET /api/bonds/{isin}` fetches a single bond. Upstream failures of the
//! list endpoint are reported according to the configured [`FailureMode`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{timestamp, AppState, ErrorResponse};
use crate::config::FailureMode;
use crate::demo::demo_bonds;
use ratings_core::{BondRecord, BondsError};

/// Where the bonds of a list response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondsMode {
    Live,
    Demo,
    Error,
}

/// Bond list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondsResponse {
    pub bonds: Vec<BondRecord>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub mode: BondsMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BondsResponse {
    fn live(bonds: Vec<BondRecord>) -> Self {
        Self {
            count: bonds.len(),
            bonds,
            timestamp: Some(timestamp()),
            mode: BondsMode::Live,
            error: None,
        }
    }

    fn demo(error: Option<String>) -> Self {
        let bonds = demo_bonds();
        Self {
            count: bonds.len(),
            bonds,
            timestamp: Some(timestamp()),
            mode: BondsMode::Demo,
            error,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            bonds: Vec::new(),
            count: 0,
            timestamp: None,
            mode: BondsMode::Error,
            error: Some(error),
        }
    }
}

/// Raw query of the list endpoint; `limit` is validated by hand so a bad
/// value gets a JSON error body
#[derive(Debug, Deserialize)]
pub struct BondsQuery {
    pub limit: Option<String>,
}

/// Build the bond routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bonds", get(list_bonds_handler))
        .route("/api/bonds/{isin}", get(get_bond_handler))
}

fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize, String> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid limit: {}", value)),
    }
}

/// Map a list failure to a response under the given failure mode
fn list_failure(mode: FailureMode, err: BondsError) -> (StatusCode, BondsResponse) {
    let message = err.to_string();

    match (mode, err) {
        (FailureMode::Demo, BondsError::QuotaExhausted) => {
            (StatusCode::TOO_MANY_REQUESTS, BondsResponse::demo(Some(message)))
        }
        (FailureMode::Demo, BondsError::Internal(_) | BondsError::NotFound(_)) => {
            let mut response = BondsResponse::demo(Some(message));
            response.timestamp = None;
            (StatusCode::INTERNAL_SERVER_ERROR, response)
        }
        (FailureMode::Demo, _) => (StatusCode::OK, BondsResponse::demo(None)),
        (FailureMode::Strict, BondsError::QuotaExhausted) => {
            (StatusCode::TOO_MANY_REQUESTS, BondsResponse::failed(message))
        }
        (FailureMode::Strict, BondsError::Internal(_) | BondsError::NotFound(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, BondsResponse::failed(message))
        }
        (FailureMode::Strict, _) => (StatusCode::SERVICE_UNAVAILABLE, BondsResponse::failed(message)),
    }
}

/// GET /api/bonds?limit=N
async fn list_bonds_handler(
    State(state): State<AppState>,
    Query(query): Query<BondsQuery>,
) -> Response {
    let limit = match parse_limit(query.limit.as_deref(), state.config.default_limit) {
        Ok(limit) => limit,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))).into_response(),
    };

    let result = state
        .with_service(move |service| service.list_bonds(limit))
        .await
        .unwrap_or_else(|e| Err(BondsError::Internal(e.to_string())));

    match result {
        Ok(bonds) => {
            info!(count = bonds.len(), limit, "Serving live bonds");
            (StatusCode::OK, Json(BondsResponse::live(bonds))).into_response()
        }
        Err(e) => {
            match &e {
                BondsError::Internal(_) => error!(error = %e, "Bond list failed"),
                _ => warn!(error = %e, mode = %state.config.failure_mode, "Bond list unavailable"),
            }
            let (status, body) = list_failure(state.config.failure_mode, e);
            (status, Json(body)).into_response()
        }
    }
}

/// GET /api/bonds/{isin}
async fn get_bond_handler(State(state): State<AppState>, Path(isin): Path<String>) -> Response {
    let lookup = isin.clone();
    let result = state
        .with_service(move |service| service.get_bond(&lookup))
        .await
        .unwrap_or_else(|e| Err(BondsError::Internal(e.to_string())));

    match result {
        Ok(bond) => (StatusCode::OK, Json(bond)).into_response(),
        Err(BondsError::NotConnected) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Bloomberg not connected")),
        )
            .into_response(),
        Err(BondsError::NotFound(_)) => {
            info!(isin = %isin, "Bond not found");
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Bond not found"))).into_response()
        }
        Err(e) => {
            error!(isin = %isin, error = %e, "Bond lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string())))
                .into_response()
        }
    }
}
