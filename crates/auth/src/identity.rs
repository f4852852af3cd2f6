//! Source of the current principal and its session credential.

use std::sync::{PoisonError, RwLock};

use admingate_core::PrincipalId;
use admingate_events::{EventBus, IdentityTransition};

/// Bearer credential of the current session.
///
/// `Debug` is redacted so the token never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

/// Supplies the current principal (if any) and its credential.
pub trait IdentityProvider: Send + Sync {
    fn current_principal(&self) -> Option<PrincipalId>;

    fn session_credential(&self) -> Option<SessionCredential>;
}

#[derive(Debug, Clone)]
struct Session {
    principal_id: PrincipalId,
    credential: SessionCredential,
}

/// In-process session holder that publishes an [`IdentityTransition`] on
/// every sign-in, sign-out and refresh.
///
/// The session is updated before the transition is published, so a consumer
/// reacting to the event always observes the new principal.
#[derive(Debug)]
pub struct SessionStore<B> {
    session: RwLock<Option<Session>>,
    bus: B,
}

impl<B> SessionStore<B>
where
    B: EventBus<IdentityTransition>,
{
    pub fn new(bus: B) -> Self {
        Self {
            session: RwLock::new(None),
            bus,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn sign_in(
        &self,
        principal_id: PrincipalId,
        credential: SessionCredential,
    ) -> Result<(), B::Error> {
        self.replace(Some(Session {
            principal_id: principal_id.clone(),
            credential,
        }));
        tracing::info!(principal = %principal_id, "signed in");
        self.bus.publish(IdentityTransition::signed_in(principal_id))
    }

    pub fn sign_out(&self) -> Result<(), B::Error> {
        self.replace(None);
        tracing::info!("signed out");
        self.bus.publish(IdentityTransition::signed_out())
    }

    /// Swap the credential (and possibly the subject) of the current session.
    pub fn refresh(
        &self,
        principal_id: PrincipalId,
        credential: SessionCredential,
    ) -> Result<(), B::Error> {
        self.replace(Some(Session {
            principal_id: principal_id.clone(),
            credential,
        }));
        tracing::debug!(principal = %principal_id, "session refreshed");
        self.bus
            .publish(IdentityTransition::session_refreshed(Some(principal_id)))
    }

    fn replace(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn read(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<B> IdentityProvider for SessionStore<B>
where
    B: EventBus<IdentityTransition>,
{
    fn current_principal(&self) -> Option<PrincipalId> {
        self.read().map(|s| s.principal_id)
    }

    fn session_credential(&self) -> Option<SessionCredential> {
        self.read().map(|s| s.credential)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use admingate_events::{InMemoryEventBus, TransitionKind};

    use super::*;
    use crate::test_support::principal;

    #[tokio::test]
    async fn transitions_follow_session_changes() {
        let bus: Arc<InMemoryEventBus<IdentityTransition>> = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe();
        let store = SessionStore::new(bus);

        store
            .sign_in(principal("u1"), SessionCredential::new("t1"))
            .unwrap();
        assert_eq!(store.current_principal(), Some(principal("u1")));
        assert_eq!(
            store.session_credential().map(|c| c.expose().to_string()),
            Some("t1".to_string())
        );

        store
            .refresh(principal("u2"), SessionCredential::new("t2"))
            .unwrap();
        store.sign_out().unwrap();
        assert_eq!(store.current_principal(), None);

        let kinds = [
            sub.recv().await.unwrap().kind(),
            sub.recv().await.unwrap().kind(),
            sub.recv().await.unwrap().kind(),
        ];
        assert_eq!(
            kinds,
            [
                TransitionKind::SignedIn,
                TransitionKind::SessionRefreshed,
                TransitionKind::SignedOut
            ]
        );
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = SessionCredential::new("secret-token");
        assert!(!format!("{c:?}").contains("secret"));
    }
}
