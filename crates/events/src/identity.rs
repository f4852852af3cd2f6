use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use admingate_core::PrincipalId;

/// What happened to the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    SignedIn,
    SignedOut,
    /// Token refresh. May carry a different subject than before.
    SessionRefreshed,
}

/// Signal that the active principal may have changed.
///
/// Consumers must not trust `principal_id` as the authoritative current
/// subject (events can be delivered late); they re-read the identity provider
/// instead. The field is informational, for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTransition {
    kind: TransitionKind,
    principal_id: Option<PrincipalId>,
    occurred_at: DateTime<Utc>,
}

impl IdentityTransition {
    pub fn new(
        kind: TransitionKind,
        principal_id: Option<PrincipalId>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            principal_id,
            occurred_at,
        }
    }

    pub fn signed_in(principal_id: PrincipalId) -> Self {
        Self::new(TransitionKind::SignedIn, Some(principal_id), Utc::now())
    }

    pub fn signed_out() -> Self {
        Self::new(TransitionKind::SignedOut, None, Utc::now())
    }

    pub fn session_refreshed(principal_id: Option<PrincipalId>) -> Self {
        Self::new(TransitionKind::SessionRefreshed, principal_id, Utc::now())
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn principal_id(&self) -> Option<&PrincipalId> {
        self.principal_id.as_ref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
