//! Values that are only meaningful on the chain they were read from.
//!
//! A [`ChainScoped`] clears itself whenever the session's chain id changes
//! or the session ends. Reads take a [`ReadTicket`] when they start; a value
//! whose ticket predates the latest change is refused, even if the session
//! has since come back to the same chain.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use blockvote_shared::ChainId;

use super::store::{SessionStore, Subscription};

/// The chain, and the generation of it, that a read started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTicket {
    chain_id: ChainId,
    generation: u64,
}

impl ReadTicket {
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }
}

struct Scope<T> {
    slot: RefCell<Option<(ChainId, T)>>,
    /// Bumped on every change of the session's chain id, including to and
    /// from "no session".
    generation: Cell<u64>,
    last_chain: Cell<Option<ChainId>>,
}

pub struct ChainScoped<T> {
    scope: Rc<Scope<T>>,
    _watch: Subscription,
}

impl<T: 'static> ChainScoped<T> {
    pub fn new(store: &SessionStore) -> Self {
        let scope = Rc::new(Scope {
            slot: RefCell::new(None),
            generation: Cell::new(0),
            last_chain: Cell::new(store.get().chain_id()),
        });
        let watched = Rc::downgrade(&scope);

        let watch = store.subscribe(move |state| {
            let Some(scope) = watched.upgrade() else {
                return;
            };
            let chain_id = state.chain_id();
            if scope.last_chain.replace(chain_id) == chain_id {
                return;
            }

            scope.generation.set(scope.generation.get() + 1);
            let dropped = scope.slot.borrow_mut().take();
            if let Some((cached_for, _)) = &dropped {
                crate::log_debug!("Invalidated value cached for chain {}", cached_for);
            }
        });

        Self {
            scope,
            _watch: watch,
        }
    }

    /// Start a read against the current chain. `None` outside a session.
    pub fn begin(&self) -> Option<ReadTicket> {
        let chain_id = self.scope.last_chain.get()?;
        Some(ReadTicket {
            chain_id,
            generation: self.scope.generation.get(),
        })
    }

    /// Cache `value` for the read that took `ticket`.
    ///
    /// Returns `false` and discards the value when the chain or session has
    /// changed since the ticket was taken.
    pub fn insert(&self, ticket: ReadTicket, value: T) -> bool {
        if ticket.generation != self.scope.generation.get() {
            crate::log_debug!("Discarding value read for stale chain {}", ticket.chain_id);
            return false;
        }
        let previous = self.scope.slot.borrow_mut().replace((ticket.chain_id, value));
        drop(previous);
        true
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.scope.slot.borrow().as_ref().map(|(_, value)| f(value))
    }

    pub fn is_empty(&self) -> bool {
        self.scope.slot.borrow().is_none()
    }

    pub fn invalidate(&self) {
        let dropped = self.scope.slot.borrow_mut().take();
        drop(dropped);
    }
}

impl<T: Clone + 'static> ChainScoped<T> {
    pub fn get(&self) -> Option<T> {
        self.with(T::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvote_shared::{Address, SessionState};

    fn chain(id: u64) -> ChainId {
        ChainId::new(id).unwrap()
    }

    fn on_chain(id: u64) -> SessionState {
        SessionState::connected(Address::from("0xabc"), chain(id))
    }

    #[test]
    fn chain_change_clears_cached_value() {
        let store = SessionStore::new();
        store.set(on_chain(1));

        let tally: ChainScoped<u32> = ChainScoped::new(&store);
        assert!(tally.insert(tally.begin().unwrap(), 42));
        assert_eq!(tally.get(), Some(42));

        store.set(on_chain(1));
        assert_eq!(tally.get(), Some(42));

        store.set(on_chain(11_155_111));
        assert!(tally.is_empty());
    }

    #[test]
    fn disconnect_clears_cached_value() {
        let store = SessionStore::new();
        store.set(on_chain(1));
        let tally = ChainScoped::new(&store);
        tally.insert(tally.begin().unwrap(), "cached".to_string());

        store.set(SessionState::Disconnected);
        assert_eq!(tally.get(), None);
        assert_eq!(tally.begin(), None);
    }

    #[test]
    fn read_started_before_chain_change_is_refused() {
        let store = SessionStore::new();
        store.set(on_chain(1));
        let tally: ChainScoped<u32> = ChainScoped::new(&store);

        let ticket = tally.begin().unwrap();
        store.set(on_chain(11_155_111));

        assert!(!tally.insert(ticket, 7));
        assert!(tally.is_empty());
    }

    #[test]
    fn returning_to_the_same_chain_does_not_revive_old_reads() {
        let store = SessionStore::new();
        store.set(on_chain(1));
        let tally: ChainScoped<u32> = ChainScoped::new(&store);

        let ticket = tally.begin().unwrap();
        store.set(on_chain(11_155_111));
        store.set(on_chain(1));

        assert!(!tally.insert(ticket, 7));
        let fresh = tally.begin().unwrap();
        assert_eq!(fresh.chain_id(), chain(1));
        assert!(tally.insert(fresh, 8));
        assert_eq!(tally.get(), Some(8));
    }

    #[test]
    fn reconnecting_on_the_same_chain_does_not_revive_old_reads() {
        let store = SessionStore::new();
        store.set(on_chain(1));
        let tally: ChainScoped<u32> = ChainScoped::new(&store);

        let ticket = tally.begin().unwrap();
        store.set(SessionState::Disconnected);
        store.set(SessionState::Connecting);
        store.set(on_chain(1));

        assert!(!tally.insert(ticket, 7));
        assert!(tally.is_empty());
    }

    #[test]
    fn dropping_the_cache_unsubscribes() {
        let store = SessionStore::new();
        let tally: ChainScoped<u32> = ChainScoped::new(&store);
        assert_eq!(store.subscriber_count(), 1);
        drop(tally);
        assert_eq!(store.subscriber_count(), 0);
    }
}
