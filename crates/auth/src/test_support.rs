//! Scripted collaborators for unit tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use admingate_core::PrincipalId;

use crate::chain::ValidationChain;
use crate::error::ValidationError;
use crate::result::Tier;
use crate::tier::{TierValidator, TierVerdict};

/// Validator that returns a fixed outcome and counts its invocations.
pub struct ScriptedValidator {
    tier: Tier,
    outcome: Mutex<Result<TierVerdict, ValidationError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedValidator {
    pub fn answering(tier: Tier, is_admin: bool) -> Arc<Self> {
        Arc::new(Self::new(tier, Ok(TierVerdict::new(is_admin)), None))
    }

    pub fn failing(tier: Tier, error: ValidationError) -> Arc<Self> {
        Arc::new(Self::new(tier, Err(error), None))
    }

    /// Answers `is_admin` only after `delay` (use with paused time).
    pub fn slow(tier: Tier, is_admin: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(tier, Ok(TierVerdict::new(is_admin)), Some(delay)))
    }

    fn new(
        tier: Tier,
        outcome: Result<TierVerdict, ValidationError>,
        delay: Option<Duration>,
    ) -> Self {
        Self {
            tier,
            outcome: Mutex::new(outcome),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_outcome(&self, outcome: Result<TierVerdict, ValidationError>) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TierValidator for ScriptedValidator {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn validate(&self, _principal: &PrincipalId) -> Result<TierVerdict, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.lock().unwrap().clone()
    }
}

/// The three tiers in priority order, handy for `ValidationChain::new`.
pub struct Tiers {
    pub remote: Arc<ScriptedValidator>,
    pub rpc: Arc<ScriptedValidator>,
    pub direct: Arc<ScriptedValidator>,
}

impl Tiers {
    pub fn new(
        remote: Arc<ScriptedValidator>,
        rpc: Arc<ScriptedValidator>,
        direct: Arc<ScriptedValidator>,
    ) -> Self {
        Self {
            remote,
            rpc,
            direct,
        }
    }

    pub fn chain(&self) -> ValidationChain {
        let tiers: Vec<Arc<dyn TierValidator>> = vec![
            self.remote.clone(),
            self.rpc.clone(),
            self.direct.clone(),
        ];
        ValidationChain::new(tiers)
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (self.remote.calls(), self.rpc.calls(), self.direct.calls())
    }
}

pub fn principal(id: &str) -> PrincipalId {
    PrincipalId::new(id).unwrap()
}

pub fn network_down() -> ValidationError {
    ValidationError::network("connection refused")
}
