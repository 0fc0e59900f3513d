// Mapping of service errors onto HTTP responses
use crate::domain::error::{ConfigurationError, DatasetError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("no live session has been started")]
    NoSession,

    #[error("failed to encode CSV: {0}")]
    Export(#[from] csv::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Dataset(DatasetError::Malformed(_)) => StatusCode::BAD_REQUEST,
            ApiError::Dataset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoSession => StatusCode::NOT_FOUND,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
