//! Tiered fallback: Tier 1 → Tier 2 → Tier 3, first definitive answer wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use admingate_core::PrincipalId;

use crate::config::DEFAULT_TIER_TIMEOUT;
use crate::error::ValidationError;
use crate::result::{Tier, ValidationResult};
use crate::tier::TierValidator;

/// Ordered list of tiers, iterated until one answers without error.
///
/// - Each tier is attempted at most once per resolution (no retry).
/// - Tiers are awaited sequentially, never in parallel.
/// - A tier that confidently answers "not admin" is final.
/// - Each call is bounded by `tier_timeout`; a timeout is a tier failure.
/// - Exhaustion yields a denying result carrying the last error. `resolve`
///   never returns `Err` and never panics on tier failure.
pub struct ValidationChain {
    tiers: Vec<Arc<dyn TierValidator>>,
    tier_timeout: Duration,
}

impl ValidationChain {
    /// Build a chain from validators in priority order.
    pub fn new(tiers: Vec<Arc<dyn TierValidator>>) -> Self {
        Self {
            tiers,
            tier_timeout: DEFAULT_TIER_TIMEOUT,
        }
    }

    pub fn with_tier_timeout(mut self, timeout: Duration) -> Self {
        self.tier_timeout = timeout;
        self
    }

    pub fn tier_timeout(&self) -> Duration {
        self.tier_timeout
    }

    /// Tiers in the order they are attempted.
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.iter().map(|t| t.tier()).collect()
    }

    /// Resolve admin status for `principal`.
    ///
    /// An absent principal short-circuits to "not admin" without contacting
    /// any tier.
    pub async fn resolve(&self, principal: Option<&PrincipalId>) -> ValidationResult {
        let Some(principal) = principal else {
            debug!("no principal; resolving to non-admin without tier calls");
            return ValidationResult::no_principal(Utc::now());
        };

        let mut last_error: Option<ValidationError> = None;

        for validator in &self.tiers {
            let tier = validator.tier();
            debug!(%principal, %tier, "attempting admin validation");

            let outcome = match tokio::time::timeout(self.tier_timeout, validator.validate(principal)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ValidationError::Timeout {
                    tier,
                    after: self.tier_timeout,
                }),
            };

            match outcome {
                Ok(verdict) => {
                    let mut result = ValidationResult::from_tier(tier, verdict.is_admin, Utc::now());
                    if let Some(id) = verdict.validation_id {
                        result = result.with_validation_id(id);
                    }
                    info!(
                        %principal,
                        %tier,
                        is_admin = result.is_admin(),
                        validation_id = %result.validation_id(),
                        "admin status resolved"
                    );
                    return result;
                }
                Err(err) => {
                    warn!(%principal, %tier, error = %err, "tier failed; falling through");
                    last_error = Some(err);
                }
            }
        }

        let result = ValidationResult::exhausted(last_error.as_ref(), Utc::now());
        error!(
            %principal,
            error = result.error().unwrap_or_default(),
            "admin validation exhausted every tier; denying"
        );
        result
    }
}

impl core::fmt::Debug for ValidationChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidationChain")
            .field("tiers", &self.tiers())
            .field("tier_timeout", &self.tier_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedValidator, Tiers, network_down, principal};

    #[tokio::test]
    async fn tier1_admin_short_circuits() {
        let tiers = Tiers::new(
            ScriptedValidator::answering(Tier::Remote, true),
            ScriptedValidator::answering(Tier::Rpc, false),
            ScriptedValidator::answering(Tier::DirectQuery, false),
        );

        let result = tiers.chain().resolve(Some(&principal("u1"))).await;

        assert!(result.is_admin());
        assert_eq!(result.produced_by(), Some(Tier::Remote));
        assert_eq!(tiers.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn tier1_failure_falls_through_to_rpc() {
        let tiers = Tiers::new(
            ScriptedValidator::failing(Tier::Remote, network_down()),
            ScriptedValidator::answering(Tier::Rpc, true),
            ScriptedValidator::answering(Tier::DirectQuery, false),
        );

        let result = tiers.chain().resolve(Some(&principal("u2"))).await;

        assert!(result.is_admin());
        assert_eq!(result.produced_by(), Some(Tier::Rpc));
        assert_eq!(tiers.calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn direct_query_not_admin_is_final() {
        let tiers = Tiers::new(
            ScriptedValidator::failing(Tier::Remote, ValidationError::server(500, "boom")),
            ScriptedValidator::failing(Tier::Rpc, ValidationError::rpc("function is_admin does not exist")),
            ScriptedValidator::answering(Tier::DirectQuery, false),
        );

        let result = tiers.chain().resolve(Some(&principal("u4"))).await;

        assert!(!result.is_admin());
        assert_eq!(result.produced_by(), Some(Tier::DirectQuery));
        assert!(!result.is_error());
    }

    #[tokio::test]
    async fn confident_denial_does_not_fall_through() {
        let tiers = Tiers::new(
            ScriptedValidator::answering(Tier::Remote, false),
            ScriptedValidator::answering(Tier::Rpc, true),
            ScriptedValidator::answering(Tier::DirectQuery, true),
        );

        let result = tiers.chain().resolve(Some(&principal("u5"))).await;

        assert!(!result.is_admin());
        assert_eq!(result.produced_by(), Some(Tier::Remote));
        assert_eq!(tiers.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn all_tiers_failing_denies_with_last_error() {
        let tiers = Tiers::new(
            ScriptedValidator::failing(Tier::Remote, network_down()),
            ScriptedValidator::failing(Tier::Rpc, ValidationError::rpc("permission denied")),
            ScriptedValidator::failing(Tier::DirectQuery, ValidationError::query("no profile row")),
        );

        let result = tiers.chain().resolve(Some(&principal("u3"))).await;

        assert!(!result.is_admin());
        assert_eq!(result.produced_by(), None);
        let error = result.error().unwrap();
        assert!(error.contains("no profile row"), "unexpected error: {error}");
        assert_eq!(tiers.calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn absent_principal_contacts_no_tier() {
        let tiers = Tiers::new(
            ScriptedValidator::answering(Tier::Remote, true),
            ScriptedValidator::answering(Tier::Rpc, true),
            ScriptedValidator::answering(Tier::DirectQuery, true),
        );

        let result = tiers.chain().resolve(None).await;

        assert!(!result.is_admin());
        assert_eq!(result.produced_by(), None);
        assert!(!result.is_error());
        assert_eq!(tiers.calls(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_tier_times_out_and_falls_through() {
        let tiers = Tiers::new(
            ScriptedValidator::slow(Tier::Remote, true, Duration::from_secs(3600)),
            ScriptedValidator::answering(Tier::Rpc, true),
            ScriptedValidator::answering(Tier::DirectQuery, false),
        );
        let chain = tiers.chain().with_tier_timeout(Duration::from_millis(200));

        let result = chain.resolve(Some(&principal("u6"))).await;

        assert!(result.is_admin());
        assert_eq!(result.produced_by(), Some(Tier::Rpc));
    }

    #[tokio::test]
    async fn empty_chain_fails_closed() {
        let chain = ValidationChain::new(Vec::new());
        let result = chain.resolve(Some(&principal("u7"))).await;

        assert!(!result.is_admin());
        assert_eq!(result.error(), Some("no validation tiers configured"));
    }

    #[tokio::test]
    async fn tier_issued_validation_id_is_kept() {
        struct Issuing(admingate_core::ValidationId);

        #[async_trait::async_trait]
        impl TierValidator for Issuing {
            fn tier(&self) -> Tier {
                Tier::Remote
            }

            async fn validate(
                &self,
                _principal: &PrincipalId,
            ) -> Result<crate::tier::TierVerdict, ValidationError> {
                Ok(crate::tier::TierVerdict::new(true).with_validation_id(self.0))
            }
        }

        let id = admingate_core::ValidationId::new();
        let tiers: Vec<Arc<dyn TierValidator>> = vec![Arc::new(Issuing(id))];
        let chain = ValidationChain::new(tiers);

        let result = chain.resolve(Some(&principal("u8"))).await;
        assert_eq!(result.validation_id(), id);
    }
}
