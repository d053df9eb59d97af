//! Explicit observer registry for authentication events.
//!
//! The HTTP client emits into an `AuthEvents` it was constructed with; front
//! ends subscribe to it. There is no global registration point.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The backend rejected the credentials; the user is logged out.
    SessionExpired,
}

pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(AuthEvent) + Send + Sync>;

#[derive(Default)]
pub struct AuthEvents {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(AuthEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|(sid, _)| *sid != id);
        guard.len() != before
    }

    /// Notify every subscriber and return how many were called.
    pub fn emit(&self, event: AuthEvent) -> usize {
        // Listeners run outside the lock so they may (un)subscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        debug!("auth event {event:?} to {} subscribers", listeners.len());
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
