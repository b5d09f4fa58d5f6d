//! Publish/subscribe of state entry and exit notifications.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Whether a state was entered or exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateEventKind {
    /// Published right before the entry hook runs.
    Try,
    /// Published right before the exit hook runs.
    Finally,
}

/// Notification about one state, displayed as `try_<state>` or `finally_<state>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateEvent {
    pub kind: StateEventKind,
    pub state: String,
}

impl StateEvent {
    pub fn enter(state: impl Into<String>) -> Self {
        Self {
            kind: StateEventKind::Try,
            state: state.into(),
        }
    }

    pub fn exit(state: impl Into<String>) -> Self {
        Self {
            kind: StateEventKind::Finally,
            state: state.into(),
        }
    }
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StateEventKind::Try => write!(f, "try_{}", self.state),
            StateEventKind::Finally => write!(f, "finally_{}", self.state),
        }
    }
}

/// Handle returned by [`Notifier::on`] and [`Notifier::once`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&StateEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

/// Named-event subscribers.
///
/// Callbacks run outside the internal lock, so a callback may subscribe or
/// unsubscribe without deadlocking.
#[derive(Default)]
pub struct Notifier {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<StateEvent, Vec<Listener>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` every time `event` is triggered.
    pub fn on<F>(&self, event: StateEvent, callback: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.subscribe(event, false, Arc::new(callback))
    }

    /// Call `callback` the next time `event` is triggered only.
    pub fn once<F>(&self, event: StateEvent, callback: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.subscribe(event, true, Arc::new(callback))
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let mut removed = false;
        listeners.retain(|_, subscribed| {
            let before = subscribed.len();
            subscribed.retain(|listener| listener.id != id);
            removed |= subscribed.len() != before;
            !subscribed.is_empty()
        });
        removed
    }

    /// Number of subscriptions waiting for `event`.
    pub fn listener_count(&self, event: &StateEvent) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Call every subscriber of `event`, dropping the one-shot ones.
    pub fn trigger(&self, event: &StateEvent) {
        let callbacks: Vec<Callback> = {
            let mut listeners = self.lock();
            let Some(subscribed) = listeners.get_mut(event) else {
                return;
            };
            let callbacks = subscribed
                .iter()
                .map(|listener| Arc::clone(&listener.callback))
                .collect();
            subscribed.retain(|listener| !listener.once);
            if subscribed.is_empty() {
                listeners.remove(event);
            }
            callbacks
        };
        for callback in callbacks {
            callback(event);
        }
    }

    fn subscribe(&self, event: StateEvent, once: bool, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(event)
            .or_default()
            .push(Listener { id, once, callback });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<StateEvent, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        let mut events: Vec<String> = listeners.keys().map(ToString::to_string).collect();
        events.sort();
        f.debug_struct("Notifier").field("events", &events).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&StateEvent) + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        (hits, move |_: &StateEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn events_display_with_prefix() {
        assert_eq!(StateEvent::enter("on.idle").to_string(), "try_on.idle");
        assert_eq!(StateEvent::exit("off").to_string(), "finally_off");
    }

    #[test]
    fn persistent_listener_sees_every_trigger() {
        let notifier = Notifier::new();
        let (hits, callback) = counter();
        notifier.on(StateEvent::enter("A"), callback);

        notifier.trigger(&StateEvent::enter("A"));
        notifier.trigger(&StateEvent::enter("A"));
        notifier.trigger(&StateEvent::exit("A"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let notifier = Notifier::new();
        let (hits, callback) = counter();
        notifier.once(StateEvent::exit("A"), callback);
        assert_eq!(notifier.listener_count(&StateEvent::exit("A")), 1);

        notifier.trigger(&StateEvent::exit("A"));
        notifier.trigger(&StateEvent::exit("A"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.listener_count(&StateEvent::exit("A")), 0);
    }

    #[test]
    fn off_unsubscribes() {
        let notifier = Notifier::new();
        let (hits, callback) = counter();
        let id = notifier.on(StateEvent::enter("A"), callback);

        assert!(notifier.off(id));
        assert!(!notifier.off(id));
        notifier.trigger(&StateEvent::enter("A"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callbacks_may_subscribe_while_triggered() {
        let notifier = Arc::new(Notifier::new());
        let inner = Arc::clone(&notifier);
        notifier.once(StateEvent::enter("A"), move |_| {
            inner.once(StateEvent::enter("A"), |_| {});
        });

        notifier.trigger(&StateEvent::enter("A"));
        assert_eq!(notifier.listener_count(&StateEvent::enter("A")), 1);
    }
}
