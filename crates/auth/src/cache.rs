//! Per-principal cache of resolutions with lazy TTL expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use admingate_core::PrincipalId;

use crate::config::DEFAULT_CACHE_TTL;
use crate::result::ValidationResult;

/// Cache of resolutions keyed by principal.
///
/// The cache is the sole owner and writer of its entries; collaborators only
/// go through this interface.
pub trait ValidationCache: Send + Sync {
    /// Cached result, or `None` when missing or expired.
    fn get(&self, principal: &PrincipalId) -> Option<ValidationResult>;

    /// Insert or replace unconditionally (error results included).
    fn put(&self, principal: &PrincipalId, result: ValidationResult);

    /// Remove one entry, or every entry when `principal` is `None`.
    fn invalidate(&self, principal: Option<&PrincipalId>);
}

/// A stored resolution. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub principal_id: PrincipalId,
    pub result: ValidationResult,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(principal_id: PrincipalId, result: ValidationResult, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| result.timestamp().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            principal_id,
            result,
            expires_at,
        }
    }

    /// Fresh while `now - result.timestamp < ttl`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Mutex-guarded in-process cache.
///
/// The TTL check and the insert each happen under the lock, so concurrent
/// resolutions cannot interleave inside a read or a write. Expired entries
/// are dropped when read; there is no background sweep.
#[derive(Debug)]
pub struct InMemoryValidationCache {
    ttl: Duration,
    entries: Mutex<HashMap<PrincipalId, CacheEntry>>,
}

impl InMemoryValidationCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read as of `now` (deterministic variant of [`ValidationCache::get`]).
    pub fn get_at(&self, principal: &PrincipalId, now: DateTime<Utc>) -> Option<ValidationResult> {
        let mut entries = self.entries();
        match entries.get(principal) {
            Some(entry) if entry.is_fresh_at(now) => Some(entry.result.clone()),
            Some(_) => {
                tracing::debug!(%principal, "cached admin status expired");
                entries.remove(principal);
                None
            }
            None => None,
        }
    }

    /// Entry for `principal`, fresh or not.
    pub fn entry(&self, principal: &PrincipalId) -> Option<CacheEntry> {
        self.entries().get(principal).cloned()
    }

    /// Number of stored entries (expired ones included until read).
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave an entry half-written
    // (entries are replaced wholesale), so a poisoned map is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<PrincipalId, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryValidationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationCache for InMemoryValidationCache {
    fn get(&self, principal: &PrincipalId) -> Option<ValidationResult> {
        self.get_at(principal, Utc::now())
    }

    fn put(&self, principal: &PrincipalId, result: ValidationResult) {
        let entry = CacheEntry::new(principal.clone(), result, self.ttl);
        self.entries().insert(principal.clone(), entry);
    }

    fn invalidate(&self, principal: Option<&PrincipalId>) {
        let mut entries = self.entries();
        match principal {
            Some(principal) => {
                entries.remove(principal);
                tracing::debug!(%principal, "admin cache entry invalidated");
            }
            None => {
                let purged = entries.len();
                entries.clear();
                tracing::debug!(purged, "admin cache purged");
            }
        }
    }
}
