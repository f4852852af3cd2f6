//! Router and handler wiring.
//!
//! - `routes.rs`: HTTP handlers
//! - `errors.rs`: error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use admingate_auth::ValidationChain;

use crate::jwt::Hs256JwtValidator;
use crate::middleware;

pub mod errors;
pub mod routes;

/// Path of the trusted validation endpoint.
pub const VALIDATE_ADMIN_PATH: &str = "/functions/validate-admin";

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `chain` is the server-side resolution path; in production it holds the
/// database tiers only.
pub fn build_app(jwt_secret: String, chain: ValidationChain) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let protected = Router::new()
        .route(VALIDATE_ADMIN_PATH, post(routes::validate_admin))
        .layer(Extension(Arc::new(chain)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
}
