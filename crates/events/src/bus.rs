//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is intentionally **lightweight** and makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels today, an auth provider's
//!   realtime channel or a broker tomorrow.
//! - **Broadcast semantics**: every subscription receives every message
//!   published after it was created.
//! - **No persistence**: a subscriber that is not listening misses messages.
//!
//! Consumers must be idempotent. Identity transitions in particular only say
//! "the principal may have changed"; handling the same transition twice must
//! be harmless.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

/// Error returned by [`Subscription::recv_timeout`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    #[error("timed out waiting for a message")]
    Timeout,

    #[error("bus closed")]
    Disconnected,
}

/// A subscription to an event stream.
///
/// ## Usage Pattern
///
/// ```ignore
/// let bus: Arc<InMemoryEventBus<IdentityTransition>> = ...;
/// let mut subscription = bus.subscribe();
///
/// while let Some(transition) = subscription.recv().await {
///     handle(transition);
/// }
/// // `None`: the bus was dropped.
/// ```
///
/// Dropping the subscription unsubscribes; the bus prunes the dead sender on
/// its next publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Wait for up to `timeout` for a message.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(RecvTimeoutError::Disconnected),
            Err(_) => Err(RecvTimeoutError::Timeout),
        }
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// IdentityProvider (sign-in / sign-out / refresh) → EventBus (publish) → Consumers
///                                                                         └─ CacheInvalidator
/// ```
///
/// `publish()` can fail (e.g. poisoned lock, broken transport). Failures are
/// surfaced to the publisher; a transition that was not delivered leaves the
/// cache to expire on its TTL.
///
/// The trait requires `Send + Sync`; multiple threads may publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
