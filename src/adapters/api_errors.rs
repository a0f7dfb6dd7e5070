use crate::domain::error::ClosureError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype over the domain error so axum can render it.
pub struct ApiError(pub ClosureError);

impl From<ClosureError> for ApiError {
    fn from(err: ClosureError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            ClosureError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            ClosureError::Configuration(msg) => {
                tracing::error!("configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "service is not configured".to_string(),
                )
            }
            ClosureError::Upstream { status, path, .. } => {
                tracing::error!(error = %self.0, "upstream error");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    format!("vendor API returned {status} for {path}"),
                )
            }
            ClosureError::Transport(err) => {
                tracing::error!("upstream transport error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_unavailable",
                    "vendor API unreachable".to_string(),
                )
            }
            ClosureError::Timeout(msg) => {
                tracing::error!("upstream timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg.clone())
            }
            ClosureError::Pagination(msg) => {
                tracing::error!("pagination error: {msg}");
                (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone())
            }
            ClosureError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_payload",
                    "unexpected payload from vendor API".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
