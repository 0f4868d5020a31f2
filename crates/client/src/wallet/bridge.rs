//! Provider event subscription.
//!
//! The bridge owns at most one listener registration. Attaching to the
//! provider it is already attached to is a no-op; attaching to a different
//! provider, or detaching, removes the previous registration first.

use std::cell::RefCell;

use super::provider::{same_provider, EventListener, ListenerId, ProviderHandle};

/// A listener registered on one provider. Dropping it unregisters.
struct Registration {
    provider: ProviderHandle,
    id: ListenerId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.provider.remove_listener(self.id);
        crate::log_debug!("Removed provider listener {}", self.id);
    }
}

#[derive(Default)]
pub struct EventBridge {
    current: RefCell<Option<Registration>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` on `provider` unless already attached to it.
    ///
    /// Returns whether a new registration was made.
    pub fn attach(&self, provider: &ProviderHandle, sink: EventListener) -> bool {
        if self.is_attached_to(provider) {
            return false;
        }
        self.detach();

        let id = provider.add_listener(sink);
        crate::log_debug!("Registered provider listener {}", id);
        *self.current.borrow_mut() = Some(Registration {
            provider: provider.clone(),
            id,
        });
        true
    }

    /// Drop the current registration, if any. Returns whether one existed.
    pub fn detach(&self) -> bool {
        let previous = self.current.borrow_mut().take();
        // Unregisters here, outside the borrow.
        previous.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn is_attached_to(&self, provider: &ProviderHandle) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|r| same_provider(&r.provider, provider))
    }

    /// The provider the live session is attached to.
    pub fn provider(&self) -> Option<ProviderHandle> {
        self.current.borrow().as_ref().map(|r| r.provider.clone())
    }
}
