use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid bearer token")]
    Unauthorized,

    /// No tier could give an authoritative answer. Details stay in the logs.
    #[error("admin lookup unavailable")]
    LookupUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            ApiError::LookupUnavailable => {
                json_error(StatusCode::SERVICE_UNAVAILABLE, "lookup_unavailable", self.to_string())
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
