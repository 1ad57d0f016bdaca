use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use super::FINSTD_STATUS_HEADER;
use super::error::GatewayError;
use super::payload::{StandardizeRequest, StandardizeResponse};
use super::state::HandlerState;
use crate::embedding::Embedder;
use crate::vectordb::CatalogStore;

/// `POST /api/fin-std`
#[instrument(skip(state, request), fields(collection = tracing::field::Empty))]
pub async fn standardize_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    E: Embedder + 'static,
    S: CatalogStore + 'static,
{
    let request: StandardizeRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let handle = request.embedding_options.into_handle(&state.default_handle);
    tracing::Span::current().record("collection", tracing::field::display(handle.qualified_name()));

    info!(
        text_len = request.text.len(),
        provider = %handle.provider,
        model = %handle.model,
        "Received standardization request"
    );
    debug!(
        term_categories = ?request.term_categories,
        llm_options = ?request.llm_options,
        "Category and LLM options accepted, not applied"
    );

    let report = state
        .standardizer
        .standardize(&request.text, handle)
        .await?;

    Ok(make_response(StandardizeResponse::from(report)))
}

pub(crate) fn make_response(body: StandardizeResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(FINSTD_STATUS_HEADER, HeaderValue::from_static("ok"));

    (StatusCode::OK, headers, Json(body)).into_response()
}
