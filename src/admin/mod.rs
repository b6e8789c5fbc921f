//! Client status API.
//!
//! # Routes
//! - `GET /api/status`: version and per-kind readiness phase
//! - `GET /api/client-status`: fresh primary/fallback snapshot of both pairs
//! - `GET /api/ready/{kind}`: gate on one client kind
//! - `GET /api/ready`: gate on both client kinds

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use self::auth::api_auth_middleware;
use self::handlers::*;
use crate::readiness::ReadinessSupervisor;

/// State shared by every API handler.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<ReadinessSupervisor>,
    /// Process-wide cancellation; aborts in-flight readiness checks on shutdown.
    pub cancel: CancellationToken,
    pub api_key: Option<Arc<str>>,
}

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/client-status", get(get_client_status))
        .route("/api/ready", get(get_all_ready))
        .route("/api/ready/{kind}", get(get_ready))
        .layer(middleware::from_fn_with_state(state.clone(), api_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the state's cancellation token fires.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Client status API listening");

    let shutdown = state.cancel.clone();
    let app = setup_api_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Client status API stopped");
    Ok(())
}
