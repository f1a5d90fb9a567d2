//! Global key-event dispatch with scoped subscriptions.
//!
//! A [`Subscription`] removes its listener when dropped, and a [`KeyBinder`]
//! holds at most one subscription at a time, so repeatedly binding the same
//! binder never leaks listeners.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::trace;

type Action = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    code: String,
    action: Action,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    // Ordered by registration so dispatch order is stable
    entries: BTreeMap<u64, Listener>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(|p| p.into_inner())
}

#[derive(Clone, Default)]
pub struct KeyDispatcher {
    listeners: Arc<Mutex<Listeners>>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for key `code` (matched case-insensitively, e.g. "Escape").
    pub fn subscribe(&self, code: &str, action: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(
            id,
            Listener {
                code: code.to_string(),
                action: Arc::new(action),
            },
        );
        trace!("Key listener {} bound to {}", id, code);

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Invoke every listener bound to `code`. Returns how many fired.
    pub fn dispatch(&self, code: &str) -> usize {
        // Collect first so actions may (un)subscribe without deadlocking
        let actions: Vec<Action> = lock(&self.listeners)
            .entries
            .values()
            .filter(|l| l.code.eq_ignore_ascii_case(code))
            .map(|l| Arc::clone(&l.action))
            .collect();

        for action in &actions {
            action();
        }
        actions.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

/// Live listener registration; dropping it unsubscribes
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.remove(&self.id);
            trace!("Key listener {} removed", self.id);
        }
    }
}

/// Binds one key to one action for as long as the binder (or binding) lives
pub struct KeyBinder {
    dispatcher: KeyDispatcher,
    subscription: Option<Subscription>,
}

impl KeyBinder {
    pub fn new(dispatcher: KeyDispatcher) -> Self {
        Self {
            dispatcher,
            subscription: None,
        }
    }

    /// Replace any existing binding
    pub fn bind(&mut self, code: &str, action: impl Fn() + Send + Sync + 'static) {
        self.subscription = None;
        self.subscription = Some(self.dispatcher.subscribe(code, action));
    }

    pub fn unbind(&mut self) {
        self.subscription = None;
    }

    pub fn is_bound(&self) -> bool {
        self.subscription.is_some()
    }
}
