//! Identity-transition listener that purges the admin cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use admingate_events::{EventBus, IdentityTransition, Subscription};

use crate::guard::AdminGuard;

/// Purges the whole cache on every identity transition, then forces a fresh
/// resolution for whoever is current now.
///
/// The purge is wholesale (not just the affected principal): a transition may
/// swap the subject entirely, and no entry may outlive the session it was
/// resolved for.
pub struct CacheInvalidator;

impl CacheInvalidator {
    /// Subscribe to `bus` and start listening. Must be called from within a
    /// Tokio runtime.
    pub fn subscribe<B>(bus: &B, guard: Arc<AdminGuard>) -> InvalidatorHandle
    where
        B: EventBus<IdentityTransition> + ?Sized,
    {
        Self::spawn(bus.subscribe(), guard)
    }

    /// Start listening on an existing subscription.
    pub fn spawn(
        mut subscription: Subscription<IdentityTransition>,
        guard: Arc<AdminGuard>,
    ) -> InvalidatorHandle {
        let shutdown = Arc::new(Notify::new());
        let handled = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn({
            let shutdown = shutdown.clone();
            let handled = handled.clone();
            async move {
                debug!("cache invalidator started");
                loop {
                    tokio::select! {
                        _ = shutdown.notified() => {
                            debug!("cache invalidator received shutdown signal");
                            break;
                        }
                        next = subscription.recv() => {
                            let Some(transition) = next else {
                                debug!("identity transition stream closed");
                                break;
                            };
                            info!(
                                kind = ?transition.kind(),
                                principal = ?transition.principal_id(),
                                "identity transition; purging admin cache"
                            );
                            guard.clear_cache(None);
                            let is_admin = guard.revalidate().await;
                            handled.fetch_add(1, Ordering::SeqCst);
                            debug!(is_admin, "forced resolution after identity transition");
                        }
                    }
                }
                debug!("cache invalidator stopped");
            }
        });

        InvalidatorHandle {
            shutdown,
            handled,
            task: Some(task),
        }
    }
}

/// Scoped subscription. Dropping it stops the listener; prefer
/// [`InvalidatorHandle::shutdown`] to let an in-progress purge finish.
#[derive(Debug)]
pub struct InvalidatorHandle {
    shutdown: Arc<Notify>,
    handled: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl InvalidatorHandle {
    /// Transitions fully processed (purge + forced resolution) so far.
    pub fn transitions_handled(&self) -> u64 {
        self.handled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Request graceful shutdown and wait for the listener to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for InvalidatorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
