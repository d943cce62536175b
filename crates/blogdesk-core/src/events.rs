//! Store change notifications
//!
//! Consumers register a listener with `BlogStore::subscribe` and get back a
//! `Subscription`. Listeners run synchronously, in registration order, after
//! the change has been persisted. Dropping the `Subscription` removes the
//! listener.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use crate::models::PostId;

/// A change to the store's collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    PostCreated(PostId),
    PostUpdated(PostId),
    MovedToTrash(PostId),
    Restored(PostId),
    PermanentlyDeleted(PostId),
    TrashEmptied { count: usize },
    /// Expired posts were removed from the trash
    AutoPurged { count: usize },
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Set while listeners are being called
    notifying: bool,
    /// Ids unsubscribed during the current notification
    removed: Vec<u64>,
}

/// The set of listeners attached to a store
#[derive(Default)]
pub struct Subscribers {
    registry: Rc<RefCell<Registry>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener with `event`
    ///
    /// Listeners may subscribe or unsubscribe (including themselves) while
    /// being called. New listeners first hear the next event.
    pub fn notify(&self, event: &StoreEvent) {
        let mut active = {
            let mut registry = self.registry.borrow_mut();
            registry.notifying = true;
            mem::take(&mut registry.listeners)
        };

        for (id, listener) in active.iter_mut() {
            if self.registry.borrow().removed.contains(id) {
                continue;
            }
            listener(event);
        }

        let (removed, added) = {
            let mut registry = self.registry.borrow_mut();
            registry.notifying = false;
            (
                mem::take(&mut registry.removed),
                mem::take(&mut registry.listeners),
            )
        };

        let (gone, mut kept): (Vec<_>, Vec<_>) = active
            .into_iter()
            .partition(|(id, _)| removed.contains(id));
        kept.extend(added);
        self.registry.borrow_mut().listeners = kept;

        // Listeners may own subscriptions; drop them with the registry released
        drop(gone);
    }
}

/// Handle to a registered listener
///
/// The listener stays registered for as long as this handle lives.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the lifetime of the store
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }

    /// Check if the listener is still registered
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().map_or(false, |registry| {
            let registry = registry.borrow();
            registry.listeners.iter().any(|(id, _)| *id == self.id)
                || (registry.notifying && !registry.removed.contains(&self.id))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let detached = {
            let mut registry = registry.borrow_mut();
            if registry.notifying {
                registry.removed.push(self.id);
            }
            registry
                .listeners
                .iter()
                .position(|(id, _)| *id == self.id)
                .map(|index| registry.listeners.remove(index))
        };

        drop(detached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<StoreEvent>>>, impl FnMut(&StoreEvent)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |event: &StoreEvent| {
            sink.borrow_mut().push(event.clone())
        })
    }

    #[test]
    fn test_notify_in_registration_order() {
        let subscribers = Subscribers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let _a = subscribers.subscribe(move |_| first.borrow_mut().push("a"));
        let second = Rc::clone(&order);
        let _b = subscribers.subscribe(move |_| second.borrow_mut().push("b"));

        subscribers.notify(&StoreEvent::TrashEmptied { count: 0 });
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let subscribers = Subscribers::new();
        let (seen, listener) = recorder();

        let subscription = subscribers.subscribe(listener);
        subscribers.notify(&StoreEvent::PostCreated(PostId::new("1")));
        assert!(subscription.is_active());

        subscription.unsubscribe();
        assert!(subscribers.is_empty());
        subscribers.notify(&StoreEvent::PostCreated(PostId::new("2")));

        assert_eq!(*seen.borrow(), vec![StoreEvent::PostCreated(PostId::new("1"))]);
    }

    #[test]
    fn test_detach_keeps_listener() {
        let subscribers = Subscribers::new();
        let (seen, listener) = recorder();

        subscribers.subscribe(listener).detach();
        subscribers.notify(&StoreEvent::AutoPurged { count: 2 });

        assert_eq!(subscribers.len(), 1);
        assert_eq!(*seen.borrow(), vec![StoreEvent::AutoPurged { count: 2 }]);
    }

    #[test]
    fn test_listener_can_drop_other_subscription() {
        let subscribers = Subscribers::new();
        let (seen, listener) = recorder();

        // The second listener is owned by the first, which drops it on the
        // first event.
        let victim = Rc::new(RefCell::new(Some(subscribers.subscribe(listener))));
        let holder = Rc::clone(&victim);
        let _killer = subscribers.subscribe(move |_| {
            holder.borrow_mut().take();
        });

        // Victim registered first, so it still sees the first event
        subscribers.notify(&StoreEvent::PostUpdated(PostId::new("1")));
        subscribers.notify(&StoreEvent::PostUpdated(PostId::new("2")));

        assert_eq!(*seen.borrow(), vec![StoreEvent::PostUpdated(PostId::new("1"))]);
        assert_eq!(subscribers.len(), 1);
    }

    #[test]
    fn test_removed_during_notify_is_skipped() {
        let subscribers = Subscribers::new();
        let (seen, listener) = recorder();

        let victim = Rc::new(RefCell::new(None));
        let holder = Rc::clone(&victim);
        let _killer = subscribers.subscribe(move |_| {
            holder.borrow_mut().take();
        });
        *victim.borrow_mut() = Some(subscribers.subscribe(listener));

        subscribers.notify(&StoreEvent::Restored(PostId::new("1")));

        assert!(seen.borrow().is_empty());
        assert_eq!(subscribers.len(), 1);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let subscribers = Subscribers::new();
        let subscription = subscribers.subscribe(|_| {});
        drop(subscribers);

        assert!(!subscription.is_active());
        // Dropping after the registry is gone is a no-op
        drop(subscription);
    }
}
