use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::AppState;
use crate::clients::ClientKind;
use crate::readiness::{ClientStatusReport, ReadinessPhase};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub execution: ReadinessPhase,
    pub consensus: ReadinessPhase,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        execution: state.supervisor.phase(ClientKind::Execution),
        consensus: state.supervisor.phase(ClientKind::Consensus),
    })
}

/// Fresh probe of both client pairs.
pub async fn get_client_status(State(state): State<AppState>) -> Json<ClientStatusReport> {
    Json(state.supervisor.client_status().await)
}

/// 200 when `kind` is ready within its one-shot budget, 503 with the reason otherwise.
pub async fn get_ready(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    let kind: ClientKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.supervisor.require_node_ready(kind, &state.cancel).await {
        Ok(()) => Json(ReadyResponse { ready: true }).into_response(),
        Err(e) => {
            tracing::debug!(kind = kind.as_str(), error = %e, "Rejecting readiness request");
            error_response(StatusCode::SERVICE_UNAVAILABLE, e)
        }
    }
}

/// Both client pairs must be ready.
pub async fn get_all_ready(State(state): State<AppState>) -> Response {
    match state.supervisor.require_all_ready(&state.cancel).await {
        Ok(()) => Json(ReadyResponse { ready: true }).into_response(),
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e),
    }
}
