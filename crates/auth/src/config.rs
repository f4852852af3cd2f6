use std::time::Duration;

/// How long a cached resolution stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Upper bound on a single tier call.
pub const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(5);

/// Guard/cache/chain tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Entries whose age reaches this value read as absent.
    pub cache_ttl: Duration,
    /// Each tier call is abandoned (and counted as a failure) after this.
    pub tier_timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            tier_timeout: DEFAULT_TIER_TIMEOUT,
        }
    }
}

impl GuardConfig {
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_tier_timeout(mut self, timeout: Duration) -> Self {
        self.tier_timeout = timeout;
        self
    }
}
