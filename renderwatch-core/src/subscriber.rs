//! Listener registry with per-listener failure isolation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use renderwatch_types::{MetricEvent, Warning};
use tracing::warn;

/// Result returned by listener callbacks.
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Consumer of engine events (dashboards, loggers, exporters).
///
/// A failing or panicking callback is logged and skipped; it never stops
/// other listeners from being notified and never reaches the caller that
/// recorded the event.
pub trait MetricListener: Send + Sync {
    /// Called for every accepted render metric.
    fn on_metric(&self, metric: &MetricEvent) -> ListenerResult;

    /// Called for every warning the engine emits.
    fn on_warning(&self, _warning: &Warning) -> ListenerResult {
        Ok(())
    }

    /// Called after the entity statistics were reset.
    fn on_reset(&self) -> ListenerResult {
        Ok(())
    }
}

struct Entry {
    id: u64,
    listener: Arc<dyn MetricListener>,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    next_id: u64,
}

/// Ordered set of listeners, keyed by identity.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    ///
    /// Registering the same `Arc` twice is a no-op that returns a handle to
    /// the existing registration.
    pub fn subscribe(&self, listener: Arc<dyn MetricListener>) -> Subscription {
        let mut registry = self.inner.lock();

        let id = match registry
            .entries
            .iter()
            .find(|entry| same_listener(&entry.listener, &listener))
        {
            Some(existing) => existing.id,
            None => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.entries.push(Entry { id, listener });
                id
            }
        };

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn notify_metric(&self, metric: &MetricEvent) {
        self.dispatch("metric", |listener| listener.on_metric(metric));
    }

    pub fn notify_warning(&self, warning: &Warning) {
        self.dispatch("warning", |listener| listener.on_warning(warning));
    }

    pub fn notify_reset(&self) {
        self.dispatch("reset", |listener| listener.on_reset());
    }

    /// Call `f` on every listener in registration order.
    ///
    /// The registry lock is released before any callback runs, so listeners
    /// may subscribe or unsubscribe from inside a callback.
    fn dispatch<F>(&self, event: &'static str, f: F)
    where
        F: Fn(&dyn MetricListener) -> ListenerResult,
    {
        let listeners: Vec<Arc<dyn MetricListener>> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|entry| entry.listener.clone())
            .collect();

        for (index, listener) in listeners.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(event, index, error = %err, "listener failed"),
                Err(_) => warn!(event, index, "listener panicked"),
            }
        }
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

fn same_listener(a: &Arc<dyn MetricListener>, b: &Arc<dyn MetricListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Handle returned by [`SubscriberRegistry::subscribe`].
///
/// Dropping it does not unsubscribe; call [`unsubscribe`](Self::unsubscribe).
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the listener. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().entries.retain(|entry| entry.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        metrics: AtomicUsize,
        resets: AtomicUsize,
    }

    impl MetricListener for Counter {
        fn on_metric(&self, _metric: &MetricEvent) -> ListenerResult {
            self.metrics.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn on_reset(&self) -> ListenerResult {
            self.resets.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    struct Failing;

    impl MetricListener for Failing {
        fn on_metric(&self, _metric: &MetricEvent) -> ListenerResult {
            Err("listener is broken".into())
        }
    }

    struct Panicking;

    impl MetricListener for Panicking {
        fn on_metric(&self, _metric: &MetricEvent) -> ListenerResult {
            panic!("listener exploded");
        }
    }

    /// Records the order listeners were called in.
    struct Ordered {
        tag: usize,
        log: Arc<Mutex<Vec<usize>>>,
    }

    impl MetricListener for Ordered {
        fn on_metric(&self, _metric: &MetricEvent) -> ListenerResult {
            self.log.lock().push(self.tag);
            Ok(())
        }
    }

    fn metric() -> MetricEvent {
        MetricEvent::builder("List").timestamp_ms(1).build()
    }

    #[test]
    fn same_listener_is_registered_once() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(Counter::default());

        registry.subscribe(counter.clone());
        registry.subscribe(counter.clone());
        registry.notify_metric(&metric());

        assert_eq!(registry.len(), 1);
        assert_eq!(counter.metrics.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(Counter::default());

        let subscription = registry.subscribe(counter.clone());
        subscription.unsubscribe();
        subscription.unsubscribe();
        registry.notify_metric(&metric());

        assert!(registry.is_empty());
        assert_eq!(counter.metrics.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn notification_follows_registration_order() {
        let registry = SubscriberRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3 {
            registry.subscribe(Arc::new(Ordered {
                tag,
                log: log.clone(),
            }));
        }
        registry.notify_metric(&metric());

        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn failing_listeners_do_not_block_others() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(Counter::default());

        registry.subscribe(Arc::new(Failing));
        registry.subscribe(Arc::new(Panicking));
        registry.subscribe(counter.clone());

        registry.notify_metric(&metric());
        registry.notify_reset();

        assert_eq!(counter.metrics.load(Ordering::Relaxed), 1);
        assert_eq!(counter.resets.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_harmless() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe(Arc::new(Counter::default()));

        drop(registry);
        subscription.unsubscribe();
    }
}
