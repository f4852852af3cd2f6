//! Tier 1: trusted server-side validation endpoint over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use admingate_auth::{
    IdentityProvider, PrincipalId, Tier, TierValidator, TierVerdict, ValidationError, ValidationId,
};

use crate::config::ConfigError;

/// Response body of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteValidationResponse {
    pub is_admin: bool,
    pub user_id: String,
    /// Unix milliseconds at which the server decided.
    pub timestamp: f64,
    pub validation_id: String,
}

/// Calls the validation endpoint with the session's bearer credential.
///
/// - `POST`, no body, `Authorization: Bearer <token>`
/// - any non-success status is a tier failure
/// - an answer about a different subject than the one asked is a tier failure
pub struct RemoteValidator {
    client: reqwest::Client,
    endpoint: String,
    identity: Arc<dyn IdentityProvider>,
}

impl RemoteValidator {
    /// `timeout` bounds the whole request; the chain applies its own bound too.
    pub fn new(
        endpoint: impl Into<String>,
        identity: Arc<dyn IdentityProvider>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, endpoint, identity))
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            identity,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TierValidator for RemoteValidator {
    fn tier(&self) -> Tier {
        Tier::Remote
    }

    async fn validate(&self, principal: &PrincipalId) -> Result<TierVerdict, ValidationError> {
        let credential = self
            .identity
            .session_credential()
            .ok_or(ValidationError::NoPrincipal)?;

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| ValidationError::network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ValidationError::server(status.as_u16(), body));
        }

        let body: RemoteValidationResponse = resp
            .json()
            .await
            .map_err(|e| ValidationError::network(format!("invalid response body: {e}")))?;

        if body.user_id != principal.as_str() {
            return Err(ValidationError::PrincipalMismatch {
                expected: principal.to_string(),
                found: body.user_id,
            });
        }

        let verdict = TierVerdict::new(body.is_admin);
        Ok(match body.validation_id.parse::<ValidationId>() {
            Ok(id) => verdict.with_validation_id(id),
            Err(_) => {
                tracing::debug!(validation_id = %body.validation_id, "non-uuid validation id; issuing our own");
                verdict
            }
        })
    }
}
