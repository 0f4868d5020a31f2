//! Connect, disconnect and network switching against the detected provider.
//!
//! [`WalletController`] is the only writer of the [`SessionStore`]. Explicit
//! calls and provider events both end up in the transitions below:
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                           Connecting --err-> Disconnected
//! Connecting --disconnect | provider disconnect | accountsChanged([])--> Disconnected
//!                           (the handshake resolves to Interrupted)
//! Connected --disconnect | provider disconnect | accountsChanged([])--> Disconnected
//! Connected --accountsChanged([a, ..])--> Connected (account = a)
//! Connected --chainChanged(c)----------> Connected (chain = c)
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use blockvote_shared::{ActiveSession, ChainId, ProviderEvent, SessionState, WalletError};
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};

use super::bridge::EventBridge;
use super::detector::ProviderDetector;
use super::provider::{ProviderHandle, WalletProvider};
use super::store::{SessionStore, Subscription};

pub type ConnectResult = Result<ActiveSession, WalletError>;

type PendingConnect = Shared<LocalBoxFuture<'static, ConnectResult>>;

struct ControllerInner {
    store: SessionStore,
    detector: Box<dyn ProviderDetector>,
    bridge: EventBridge,
    in_flight: RefCell<Option<PendingConnect>>,
    /// Bumped by every handshake start and every reset; a handshake whose
    /// epoch is no longer current must not write its result.
    epoch: Cell<u64>,
}

/// Owns the wallet session. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct WalletController {
    inner: Rc<ControllerInner>,
}

impl WalletController {
    pub fn new(detector: impl ProviderDetector + 'static) -> Self {
        Self::with_store(detector, SessionStore::new())
    }

    pub fn with_store(detector: impl ProviderDetector + 'static, store: SessionStore) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                store,
                detector: Box::new(detector),
                bridge: EventBridge::new(),
                in_flight: RefCell::new(None),
                epoch: Cell::new(0),
            }),
        }
    }

    pub fn session(&self) -> SessionState {
        self.inner.store.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> Subscription {
        self.inner.store.subscribe(listener)
    }

    /// Read-only access for consumers that want their own store handle.
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    /// Whether provider events are currently feeding the session.
    pub fn is_listening(&self) -> bool {
        self.inner.bridge.is_attached()
    }

    /// Ask the wallet for account access and start a session.
    ///
    /// While a handshake is in flight, further calls wait on it instead of
    /// starting another one. Already connected: returns the current session.
    pub async fn connect(&self) -> ConnectResult {
        if let Some(active) = self.inner.store.get().active() {
            return Ok(active.clone());
        }
        self.pending_connect().await
    }

    fn pending_connect(&self) -> PendingConnect {
        if let Some(pending) = self.inner.in_flight.borrow().as_ref() {
            crate::log_debug!("connect: joining in-flight handshake");
            return pending.clone();
        }

        let pending = handshake(Rc::downgrade(&self.inner))
            .boxed_local()
            .shared();
        *self.inner.in_flight.borrow_mut() = Some(pending.clone());
        pending
    }

    /// Forget the session locally. The provider is not contacted.
    pub fn disconnect(&self) {
        self.inner.reset("disconnect requested");
    }

    /// Stop feeding provider events into the session and abandon any
    /// in-flight handshake. Used when the UI root unmounts.
    ///
    /// A live session is left as it is; an abandoned handshake falls back to
    /// `Disconnected`.
    pub fn stop_listening(&self) {
        self.inner.next_epoch();
        self.inner.in_flight.borrow_mut().take();
        if self.inner.bridge.detach() {
            crate::log_debug!("Stopped listening to provider events");
        }
        if self.inner.store.get().is_connecting() {
            crate::log_info!("Wallet session reset: handshake abandoned");
            self.inner.store.set(SessionState::Disconnected);
        }
    }

    /// Ask the wallet to change network.
    ///
    /// The session's chain id is left alone; the provider's `chainChanged`
    /// event is what updates it.
    pub async fn switch_network(&self, target: ChainId) -> Result<(), WalletError> {
        let provider = self
            .inner
            .bridge
            .provider()
            .or_else(|| self.inner.detector.detect())
            .ok_or(WalletError::ProviderMissing)?;

        crate::log_info!("Requesting switch to chain {}", target);
        provider.switch_chain(target).await.map_err(|e| {
            let err = WalletError::from_switch(target, e);
            crate::log_warn!("Network switch to {} failed: {}", target, err);
            err
        })
    }

    /// Resume a session the wallet already authorized, without prompting.
    ///
    /// Anything short of an authorized account leaves the session untouched.
    pub async fn restore(&self) -> Option<ActiveSession> {
        if let Some(active) = self.inner.store.get().active() {
            return Some(active.clone());
        }
        if !matches!(self.inner.store.get(), SessionState::Disconnected) {
            return None;
        }

        let provider = self.inner.detector.detect()?;
        let epoch = self.inner.epoch.get();

        let account = match provider.accounts().await {
            Ok(accounts) => accounts.into_iter().next()?,
            Err(e) => {
                crate::log_warn!("Could not read authorized accounts: {}", e);
                return None;
            }
        };
        let chain_id = match provider.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(e) => {
                crate::log_warn!("Could not read chain id: {}", e);
                return None;
            }
        };

        let unchanged = self.inner.epoch.get() == epoch
            && matches!(self.inner.store.get(), SessionState::Disconnected);
        if !unchanged {
            crate::log_debug!("restore: session changed meanwhile, dropping result");
            return None;
        }

        let active = ActiveSession { account, chain_id };
        crate::log_info!("Restored session for {} on chain {}", active.account, chain_id);
        self.inner.store.set(SessionState::Connected(active.clone()));
        self.inner.attach_bridge(&provider);
        Some(active)
    }
}

impl ControllerInner {
    fn next_epoch(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }

    /// Back to `Disconnected`, no matter where we were.
    fn reset(&self, reason: &str) {
        self.next_epoch();
        self.in_flight.borrow_mut().take();
        self.bridge.detach();

        if self.store.get() != SessionState::Disconnected {
            crate::log_info!("Wallet session reset: {}", reason);
            self.store.set(SessionState::Disconnected);
        }
    }

    fn attach_bridge(self: &Rc<Self>, provider: &ProviderHandle) {
        let weak = Rc::downgrade(self);
        let sink = Rc::new(move |event: ProviderEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(event);
            }
        });
        self.bridge.attach(provider, sink);
    }

    fn handle_event(&self, event: ProviderEvent) {
        let active = match self.store.get() {
            SessionState::Connected(active) => active,
            SessionState::Connecting => {
                // Only losing the wallet matters mid-handshake; the handshake
                // reads the account and chain itself.
                match event {
                    ProviderEvent::Disconnect(_) => {
                        self.reset("provider disconnected during handshake")
                    }
                    ProviderEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                        self.reset("wallet reported no accounts during handshake")
                    }
                    other => {
                        crate::log_debug!("Ignoring {:?} during handshake", other.kind())
                    }
                }
                return;
            }
            SessionState::Disconnected => {
                crate::log_debug!("Ignoring {:?} outside a session", event.kind());
                return;
            }
        };

        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => self.reset("wallet reported no accounts"),
                Some(account) if account == active.account => {}
                Some(account) => {
                    crate::log_info!("Active account changed to {}", account);
                    self.store.set(SessionState::connected(account, active.chain_id));
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                if chain_id != active.chain_id {
                    crate::log_info!("Chain changed {} -> {}", active.chain_id, chain_id);
                    self.store.set(SessionState::connected(active.account, chain_id));
                }
            }
            ProviderEvent::Disconnect(error) => {
                if let Some(error) = error {
                    crate::log_warn!("Provider disconnected: {}", error);
                }
                self.reset("provider disconnected");
            }
        }
    }
}

/// The account handshake behind [`WalletController::connect`].
async fn handshake(weak: Weak<ControllerInner>) -> ConnectResult {
    let (provider, epoch) = {
        let inner = weak.upgrade().ok_or(WalletError::Interrupted)?;
        let epoch = inner.next_epoch();
        let Some(provider) = inner.detector.detect() else {
            inner.in_flight.borrow_mut().take();
            crate::log_warn!("connect: no wallet provider detected");
            return Err(WalletError::ProviderMissing);
        };
        crate::log_info!("connect: requesting account access");
        inner.store.set(SessionState::Connecting);
        inner.attach_bridge(&provider);
        (provider, epoch)
    };

    let result = negotiate(provider.as_ref()).await;

    let inner = weak.upgrade().ok_or(WalletError::Interrupted)?;
    if inner.epoch.get() != epoch {
        crate::log_info!("connect: session reset during handshake, discarding result");
        return Err(WalletError::Interrupted);
    }
    inner.in_flight.borrow_mut().take();

    match result {
        Ok(active) => {
            crate::log_info!("Wallet connected: {} on chain {}", active.account, active.chain_id);
            inner.store.set(SessionState::Connected(active.clone()));
            inner.attach_bridge(&provider);
            Ok(active)
        }
        Err(err) => {
            crate::log_warn!("Wallet connection failed: {}", err);
            inner.bridge.detach();
            inner.store.set(SessionState::Disconnected);
            Err(err)
        }
    }
}

async fn negotiate(provider: &dyn WalletProvider) -> ConnectResult {
    let accounts = provider
        .request_accounts()
        .await
        .map_err(WalletError::from_connect)?;
    let account = accounts
        .into_iter()
        .next()
        .ok_or_else(|| WalletError::ProviderError("The wallet returned no accounts".to_string()))?;
    let chain_id = provider
        .chain_id()
        .await
        .map_err(WalletError::from_connect)?;

    Ok(ActiveSession { account, chain_id })
}
