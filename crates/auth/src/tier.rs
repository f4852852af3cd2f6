use async_trait::async_trait;

use admingate_core::{PrincipalId, ValidationId};

use crate::error::ValidationError;
use crate::result::Tier;

/// A tier's definitive answer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TierVerdict {
    pub is_admin: bool,
    /// Correlation id issued by the tier, if it issues one.
    pub validation_id: Option<ValidationId>,
}

impl TierVerdict {
    pub fn new(is_admin: bool) -> Self {
        Self {
            is_admin,
            validation_id: None,
        }
    }

    pub fn with_validation_id(mut self, validation_id: ValidationId) -> Self {
        self.validation_id = Some(validation_id);
        self
    }
}

/// One validation strategy in the fallback chain.
///
/// Implementations make exactly one attempt per call (no internal retry) and
/// report any failure as `Err`; `Ok(TierVerdict { is_admin: false, .. })`
/// means "confidently not admin" and ends the chain.
#[async_trait]
pub trait TierValidator: Send + Sync {
    fn tier(&self) -> Tier;

    async fn validate(&self, principal: &PrincipalId) -> Result<TierVerdict, ValidationError>;
}
