//! In-memory event bus for single-process deployments and tests.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO
/// - Unbounded per-subscriber queues (publish never waits)
/// - Best-effort fan-out
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions (as of the last publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        let before = subs.len();
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        if subs.len() < before {
            tracing::debug!(dropped = before - subs.len(), live = subs.len(), "pruned closed subscribers");
        }

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();

        // A poisoned bus cannot deliver; hand back an already-closed
        // subscription so `recv` reports the end of the stream.
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(_) => {
                tracing::warn!("event bus lock poisoned; subscription closed on creation");
                drop(tx);
            }
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::bus::RecvTimeoutError;

    #[tokio::test]
    async fn every_subscriber_receives_each_message() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(7).unwrap();

        assert_eq!(a.recv().await, Some(7));
        assert_eq!(b.recv().await, Some(7));
    }

    #[tokio::test]
    async fn dropped_subscription_is_pruned_on_publish() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let keep = bus.subscribe();
        let gone = bus.subscribe();
        drop(gone);

        bus.publish(1).unwrap();

        assert_eq!(bus.subscriber_count(), 1);
        drop(keep);
    }

    #[tokio::test]
    async fn subscription_sees_only_later_messages() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        bus.publish(1).unwrap();

        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_err());

        bus.publish(2).unwrap();
        assert_eq!(sub.try_recv().unwrap(), 2);
    }

    #[tokio::test]
    async fn poisoned_bus_closes_new_subscriptions() {
        let bus: Arc<InMemoryEventBus<u32>> = Arc::new(InMemoryEventBus::new());
        let poisoner = bus.clone();
        let _ = std::thread::spawn(move || {
            let _held = poisoner.subscribers.lock().unwrap();
            panic!("poison the subscriber list");
        })
        .join();

        let mut sub = bus.subscribe();

        assert_eq!(sub.recv().await, None);
        assert_eq!(bus.publish(1), Err(InMemoryBusError::Poisoned));
    }

    #[tokio::test(start_paused = true)]
    async fn recv_timeout_reports_timeout_and_disconnect() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let mut sub = bus.subscribe();

        let err = sub.recv_timeout(Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(err, RecvTimeoutError::Timeout);

        drop(bus);
        let err = sub.recv_timeout(Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(err, RecvTimeoutError::Disconnected);
    }
}
