use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode};

use admingate_auth::ValidationChain;
use admingate_infra::RemoteValidationResponse;

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Answer "is the bearer an administrator?" for the token's own subject.
///
/// A definitive "no" is a 200 with `isAdmin: false`; only an exhausted chain
/// is an error, so clients never mistake an outage for a denial.
pub async fn validate_admin(
    Extension(chain): Extension<Arc<ValidationChain>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<RemoteValidationResponse>, ApiError> {
    let principal_id = principal.principal_id();
    let result = chain.resolve(Some(principal_id)).await;

    if let Some(err) = result.error() {
        tracing::warn!(principal = %principal_id, error = err, "admin lookup unavailable");
        return Err(ApiError::LookupUnavailable);
    }

    tracing::info!(
        principal = %principal_id,
        is_admin = result.is_admin(),
        validation_id = %result.validation_id(),
        "admin validation served"
    );

    Ok(Json(RemoteValidationResponse {
        is_admin: result.is_admin(),
        user_id: principal_id.to_string(),
        timestamp: result.timestamp().timestamp_millis() as f64,
        validation_id: result.validation_id().to_string(),
    }))
}
