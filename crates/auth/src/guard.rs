//! Public façade: the admin status collaborators gate rendering on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Notify, watch};
use tracing::debug;

use admingate_core::PrincipalId;

use crate::cache::{InMemoryValidationCache, ValidationCache};
use crate::chain::ValidationChain;
use crate::config::GuardConfig;
use crate::identity::IdentityProvider;
use crate::result::ValidationResult;
use crate::tier::TierValidator;

/// Resolution lifecycle.
///
/// `Uninitialized → Validating → { Resolved | Errored }`, and back to
/// `Validating` on every activation or revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Uninitialized,
    Validating,
    /// A tier answered (or there is no principal). Never carries an error.
    Resolved(ValidationResult),
    /// Every tier failed. Always reports `is_admin = false`.
    Errored(ValidationResult),
}

impl GuardState {
    pub fn is_admin(&self) -> Option<bool> {
        match self {
            GuardState::Resolved(result) => Some(result.is_admin()),
            GuardState::Errored(_) => Some(false),
            GuardState::Uninitialized | GuardState::Validating => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GuardState::Validating)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GuardState::Errored(result) => result.error(),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        match self {
            GuardState::Resolved(result) | GuardState::Errored(result) => Some(result),
            _ => None,
        }
    }

    pub fn status(&self) -> GuardStatus {
        GuardStatus {
            is_admin: self.is_admin(),
            is_loading: self.is_loading(),
            error: self.error().map(str::to_string),
        }
    }
}

/// Snapshot consumed by UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardStatus {
    pub is_admin: Option<bool>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ReadMode {
    CacheFirst,
    BypassCache,
}

/// Admin guard for the current session.
///
/// The primary read path never fails: every error is folded into a denying
/// result. Only the most recently *started* resolution may settle the
/// reported state; an older one that completes late still writes its result
/// to the cache (under its own principal) but leaves the state alone and
/// answers `false` to its caller.
pub struct AdminGuard {
    identity: Arc<dyn IdentityProvider>,
    chain: Arc<ValidationChain>,
    cache: Arc<dyn ValidationCache>,
    state: watch::Sender<GuardState>,
    epoch: AtomicU64,
    torn_down: AtomicBool,
    teardown: Notify,
}

impl AdminGuard {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        chain: Arc<ValidationChain>,
        cache: Arc<dyn ValidationCache>,
    ) -> Self {
        let (state, _) = watch::channel(GuardState::Uninitialized);
        Self {
            identity,
            chain,
            cache,
            state,
            epoch: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
            teardown: Notify::new(),
        }
    }

    /// Wire a guard with an in-memory cache from tiers in priority order.
    pub fn with_config(
        identity: Arc<dyn IdentityProvider>,
        tiers: Vec<Arc<dyn TierValidator>>,
        config: &GuardConfig,
    ) -> Self {
        let chain = ValidationChain::new(tiers).with_tier_timeout(config.tier_timeout);
        let cache = InMemoryValidationCache::with_ttl(config.cache_ttl);
        Self::new(identity, Arc::new(chain), Arc::new(cache))
    }

    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> GuardStatus {
        self.state.borrow().status()
    }

    /// Last settled answer; `false` while unresolved.
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin().unwrap_or(false)
    }

    /// Receive every state change.
    pub fn watch(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    pub fn current_principal(&self) -> Option<PrincipalId> {
        self.identity.current_principal()
    }

    /// Resolve for the current principal, serving from the cache when fresh.
    pub async fn activate(&self) -> bool {
        self.resolve(ReadMode::CacheFirst).await
    }

    /// Resolve for the current principal through the tier chain, skipping the
    /// cache read. The fresh result is still written through.
    pub async fn revalidate(&self) -> bool {
        self.resolve(ReadMode::BypassCache).await
    }

    /// Drop cached results (one principal, or all). The reported state is
    /// unchanged until the next resolution.
    pub fn clear_cache(&self, principal: Option<&PrincipalId>) {
        self.cache.invalidate(principal);
    }

    /// Cancel in-flight work and refuse further resolutions. Results that
    /// complete afterwards are discarded.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.teardown.notify_waiters();
        self.state.send_replace(GuardState::Uninitialized);
        debug!("admin guard torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    async fn resolve(&self, mode: ReadMode) -> bool {
        let cancelled = self.teardown.notified();
        tokio::pin!(cancelled);
        if self.is_torn_down() {
            return false;
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(GuardState::Validating);

        let principal = self.identity.current_principal();

        if mode == ReadMode::CacheFirst {
            if let Some(hit) = principal.as_ref().and_then(|p| self.cache.get(p)) {
                debug!(principal = ?principal, is_admin = hit.is_admin(), "admin status served from cache");
                return self.settle(epoch, hit);
            }
        }

        let result = tokio::select! {
            biased;
            _ = &mut cancelled => {
                debug!("resolution abandoned: guard torn down");
                return false;
            }
            result = self.chain.resolve(principal.as_ref()) => result,
        };

        if self.is_torn_down() {
            return false;
        }
        if let Some(principal) = principal.as_ref() {
            self.cache.put(principal, result.clone());
        }
        self.settle(epoch, result)
    }

    fn settle(&self, epoch: u64, result: ValidationResult) -> bool {
        let is_admin = result.is_admin();
        let applied = self.state.send_if_modified(|state| {
            if self.is_torn_down() || self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *state = if result.is_error() {
                GuardState::Errored(result)
            } else {
                GuardState::Resolved(result)
            };
            true
        });
        if !applied {
            // The answer may belong to a principal who is no longer current.
            debug!(epoch, "resolution superseded; reported state left untouched");
            return false;
        }
        is_admin
    }
}

impl core::fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminGuard")
            .field("state", &*self.state.borrow())
            .field("chain", &self.chain)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
