//! The single source of truth for the wallet session.
//!
//! Writers replace the whole [`SessionState`]; readers either take a snapshot
//! with [`SessionStore::get`] or subscribe and get called on every write.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use blockvote_shared::SessionState;

type Listener = Rc<dyn Fn(&SessionState)>;

struct StoreInner {
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    /// Writes issued while listeners are being notified.
    pending: RefCell<VecDeque<SessionState>>,
    notifying: Cell<bool>,
}

/// Shared handle to the session. Cloning shares the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<StoreInner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// A fresh store, `Disconnected`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(SessionState::Disconnected),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    pub fn get(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Replace the session and notify every subscriber once, in subscription
    /// order.
    ///
    /// A `set` made from inside a listener is applied after the current round
    /// of notifications finishes, so listeners see writes in call order.
    pub fn set(&self, next: SessionState) {
        self.inner.pending.borrow_mut().push_back(next);
        if self.inner.notifying.replace(true) {
            return;
        }
        // Clears `notifying` even if a listener panics.
        let _round = NotifyRound(&self.inner.notifying);

        loop {
            let Some(next) = self.inner.pending.borrow_mut().pop_front() else {
                break;
            };
            *self.inner.state.borrow_mut() = next.clone();

            // Snapshot so listeners may subscribe or unsubscribe while running.
            let listeners: Vec<Listener> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(&next);
            }
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        Subscription {
            store: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

struct NotifyRound<'a>(&'a Cell<bool>);

impl Drop for NotifyRound<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Keeps a store listener registered.
pub struct Subscription {
    store: Weak<StoreInner>,
    id: Option<u64>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(store) = self.store.upgrade() else {
            return;
        };
        // The listener is dropped after the borrow ends; its captures may own
        // subscriptions of their own.
        let removed = {
            let mut listeners = store.listeners.borrow_mut();
            listeners
                .iter()
                .position(|(lid, _)| *lid == id)
                .map(|pos| listeners.remove(pos))
        };
        drop(removed);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvote_shared::{Address, ChainId};

    fn connected(chain: u64) -> SessionState {
        SessionState::connected(Address::from("0xabc"), ChainId::new(chain).unwrap())
    }

    #[test]
    fn starts_disconnected() {
        assert_eq!(SessionStore::new().get(), SessionState::Disconnected);
    }

    #[test]
    fn each_set_notifies_each_subscriber_once_in_order() {
        let store = SessionStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = log.clone();
            store.subscribe(move |s| log.borrow_mut().push(("first", s.clone())))
        };
        let second = {
            let log = log.clone();
            store.subscribe(move |s| log.borrow_mut().push(("second", s.clone())))
        };

        store.set(SessionState::Connecting);
        store.set(connected(1));
        store.set(connected(1));

        assert_eq!(
            *log.borrow(),
            vec![
                ("first", SessionState::Connecting),
                ("second", SessionState::Connecting),
                ("first", connected(1)),
                ("second", connected(1)),
                ("first", connected(1)),
                ("second", connected(1)),
            ]
        );
        drop((first, second));
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let store = SessionStore::new();
        let hits = Rc::new(Cell::new(0));

        let sub = {
            let hits = hits.clone();
            store.subscribe(move |_| hits.set(hits.get() + 1))
        };
        store.set(SessionState::Connecting);
        sub.unsubscribe();
        store.set(SessionState::Disconnected);

        assert_eq!(hits.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn nested_set_is_delivered_after_current_round() {
        let store = SessionStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let writer = {
            let handle = store.clone();
            store.subscribe(move |s| {
                if *s == SessionState::Connecting {
                    handle.set(connected(5777));
                }
            })
        };
        let reader = {
            let log = log.clone();
            store.subscribe(move |s| log.borrow_mut().push(s.clone()))
        };

        store.set(SessionState::Connecting);

        assert_eq!(*log.borrow(), vec![SessionState::Connecting, connected(5777)]);
        assert_eq!(store.get(), connected(5777));
        drop((writer, reader));
    }

    #[test]
    fn panicking_listener_does_not_wedge_the_store() {
        let store = SessionStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let armed = Rc::new(Cell::new(true));

        let sub = {
            let seen = seen.clone();
            let armed = armed.clone();
            store.subscribe(move |s| {
                if armed.replace(false) {
                    panic!("listener failed");
                }
                seen.borrow_mut().push(s.clone());
            })
        };

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.set(SessionState::Connecting)
        }));
        assert!(outcome.is_err());
        assert_eq!(store.get(), SessionState::Connecting);

        store.set(connected(1));
        assert_eq!(store.get(), connected(1));
        assert_eq!(*seen.borrow(), vec![connected(1)]);
        drop(sub);
    }

    #[test]
    fn subscription_outliving_store_is_harmless() {
        let store = SessionStore::new();
        let sub = store.subscribe(|_| {});
        drop(store);
        drop(sub);
    }
}
