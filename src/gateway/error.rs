use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::FINSTD_STATUS_HEADER;
use crate::standardize::StandardizeError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("standardization failed: {0}")]
    StandardizationFailed(String),
}

impl From<StandardizeError> for GatewayError {
    fn from(e: StandardizeError) -> Self {
        if e.is_configuration() {
            GatewayError::Configuration(e.to_string())
        } else {
            GatewayError::StandardizationFailed(e.to_string())
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, finstd_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Configuration(_) => (StatusCode::BAD_REQUEST, "configuration_error"),
            GatewayError::StandardizationFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "standardization_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            FINSTD_STATUS_HEADER,
            HeaderValue::from_static(finstd_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
