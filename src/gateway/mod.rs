//! HTTP gateway (Axum) for term standardization.
//!
//! Used by the `finstd` server binary and the integration tests.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::standardize_handler;
pub use state::HandlerState;

use crate::embedding::Embedder;
use crate::vectordb::CatalogStore;
use payload::{ComponentStatus, HealthResponse, ReadyResponse, RootResponse};

/// Response header carrying the gateway's outcome for the request.
pub const FINSTD_STATUS_HEADER: &str = "x-finstd-status";

pub const FINSTD_STATUS_HEALTHY: &str = "healthy";
pub const FINSTD_STATUS_READY: &str = "ready";
pub const FINSTD_STATUS_NOT_READY: &str = "pending";

pub const SERVICE_NAME: &str = "finance_term_standardization";

pub fn create_router_with_state<E, S>(state: HandlerState<E, S>) -> Router
where
    E: Embedder + 'static,
    S: CatalogStore + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler::<E, S>))
        .route("/api/fin-std", post(standardize_handler::<E, S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_headers(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(FINSTD_STATUS_HEADER, HeaderValue::from_static(value));
    headers
}

#[tracing::instrument]
pub async fn root_handler() -> Response {
    (
        StatusCode::OK,
        status_headers(FINSTD_STATUS_HEALTHY),
        Json(RootResponse {
            message: "Financial term standardization API is running",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
        .into_response()
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        status_headers(FINSTD_STATUS_HEALTHY),
        Json(HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<E, S>(State(state): State<HandlerState<E, S>>) -> Response
where
    E: Embedder + 'static,
    S: CatalogStore + 'static,
{
    let vectordb_ready = state.standardizer.store().is_ready().await;

    let components = ComponentStatus {
        http: FINSTD_STATUS_READY,
        vectordb: if vectordb_ready {
            FINSTD_STATUS_READY
        } else {
            FINSTD_STATUS_NOT_READY
        },
        embedder_mode: if state.embedder_stub { "stub" } else { "real" },
    };

    let (status_code, status_msg) = if vectordb_ready {
        (StatusCode::OK, FINSTD_STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, FINSTD_STATUS_NOT_READY)
    };

    (
        status_code,
        status_headers(status_msg),
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
