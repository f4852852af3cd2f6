//! `admingate-auth`: admin authorization resolution and caching.
//!
//! Resolves the single claim "is the current principal an administrator?"
//! through an ordered chain of validation tiers, caches the answer per
//! principal with a fixed TTL, and purges the cache whenever the session
//! identity changes. Every failure path resolves to "not admin".
//!
//! No HTTP or storage dependencies here; concrete tiers
//! live in `admingate-infra`.

pub mod cache;
pub mod chain;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod invalidator;
pub mod result;
pub mod tier;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{CacheEntry, InMemoryValidationCache, ValidationCache};
pub use chain::ValidationChain;
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use config::GuardConfig;
pub use error::ValidationError;
pub use guard::{AdminGuard, GuardState, GuardStatus};
pub use identity::{IdentityProvider, SessionCredential, SessionStore};
pub use invalidator::{CacheInvalidator, InvalidatorHandle};
pub use result::{Tier, ValidationResult};
pub use tier::{TierValidator, TierVerdict};

pub use admingate_core::{PrincipalId, ValidationId};
