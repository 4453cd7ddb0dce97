//! JSON error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::SportstockError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

pub fn status_from_error(err: &SportstockError) -> StatusCode {
    match err {
        SportstockError::AssetNotFound { .. } => StatusCode::NOT_FOUND,
        SportstockError::ConfigMissing { .. }
        | SportstockError::ConfigInvalid { .. }
        | SportstockError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        SportstockError::Database { .. }
        | SportstockError::DatabaseQuery { .. }
        | SportstockError::InvalidGameDate { .. }
        | SportstockError::Upstream { .. }
        | SportstockError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SportstockError> for WebError {
    fn from(err: SportstockError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err: WebError = SportstockError::asset_not_found("abc").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Asset not found: abc");
    }

    #[test]
    fn config_errors_map_to_400() {
        let err = SportstockError::ConfigMissing {
            section: "sqlite".into(),
            key: "path".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_map_to_500() {
        let err = SportstockError::DatabaseQuery {
            reason: "disk I/O error".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
