use chrono::{DateTime, Utc};
use serde::Serialize;

use admingate_core::ValidationId;

use crate::error::ValidationError;

/// One of the ordered validation strategies.
///
/// Ordering follows trust: the remote endpoint is authoritative, the direct
/// profile read is the last resort.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Tier 1: trusted server-side validation endpoint.
    Remote,
    /// Tier 2: database-side `is_admin(user_id)` function.
    Rpc,
    /// Tier 3: direct read of the profile role.
    DirectQuery,
}

impl Tier {
    /// 1-based position in the fallback order.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Remote => 1,
            Tier::Rpc => 2,
            Tier::DirectQuery => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Remote => "remote",
            Tier::Rpc => "rpc",
            Tier::DirectQuery => "direct_query",
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "tier{} ({})", self.rank(), self.as_str())
    }
}

/// Outcome of one resolution.
///
/// Fields are private: `is_admin == true` is only reachable through
/// [`ValidationResult::from_tier`], i.e. when a tier answered without error.
/// Every other constructor denies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_admin: bool,
    produced_by: Option<Tier>,
    timestamp: DateTime<Utc>,
    validation_id: ValidationId,
    error: Option<String>,
}

impl ValidationResult {
    /// A definitive answer from `tier`.
    pub fn from_tier(tier: Tier, is_admin: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_admin,
            produced_by: Some(tier),
            timestamp,
            validation_id: ValidationId::new(),
            error: None,
        }
    }

    /// No authenticated subject: not admin, no tier consulted, not an error.
    pub fn no_principal(timestamp: DateTime<Utc>) -> Self {
        Self {
            is_admin: false,
            produced_by: None,
            timestamp,
            validation_id: ValidationId::new(),
            error: None,
        }
    }

    /// Every tier failed (or none is configured). Fails closed.
    pub fn exhausted(last_error: Option<&ValidationError>, timestamp: DateTime<Utc>) -> Self {
        let error = match last_error {
            Some(e) => format!("all validation tiers failed; last error: {e}"),
            None => "no validation tiers configured".to_string(),
        };
        Self {
            is_admin: false,
            produced_by: None,
            timestamp,
            validation_id: ValidationId::new(),
            error: Some(error),
        }
    }

    /// Carry a correlation id issued by the tier (Tier 1 returns its own).
    pub fn with_validation_id(mut self, validation_id: ValidationId) -> Self {
        self.validation_id = validation_id;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn produced_by(&self) -> Option<Tier> {
        self.produced_by
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn validation_id(&self) -> ValidationId {
        self.validation_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_result_denies_and_reports_last_error() {
        let err = ValidationError::Query("relation \"profiles\" does not exist".into());
        let result = ValidationResult::exhausted(Some(&err), Utc::now());

        assert!(!result.is_admin());
        assert_eq!(result.produced_by(), None);
        assert!(result.error().unwrap().contains("profiles"));
    }

    #[test]
    fn tier_result_has_provenance_and_no_error() {
        let result = ValidationResult::from_tier(Tier::Rpc, true, Utc::now());
        assert!(result.is_admin());
        assert_eq!(result.produced_by().map(Tier::rank), Some(2));
        assert!(!result.is_error());
    }

    #[test]
    fn serializes_in_camel_case() {
        let result = ValidationResult::from_tier(Tier::Remote, false, Utc::now());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["producedBy"], "remote");
        assert!(json["validationId"].is_string());
    }
}
