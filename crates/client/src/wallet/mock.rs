//! Scripted in-memory provider for tests and offline demos.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use blockvote_shared::{codes, Address, ChainId, ProviderEvent, ProviderRpcError};
use futures_channel::oneshot;

use super::provider::{EventListener, ListenerId, WalletProvider};

pub const DEFAULT_ACCOUNT: &str = "0xABCD5e0B6eA4C1c2b8A5d3E7F0a9B1c2D3e41234";

/// Behaves like a wallet whose user approves everything unless told otherwise.
pub struct MockProvider {
    accounts: RefCell<Vec<Address>>,
    authorized: Cell<bool>,
    chain_id: Cell<ChainId>,
    wallet_chains: RefCell<Vec<ChainId>>,
    emit_on_switch: Cell<bool>,
    connect_error: RefCell<Option<ProviderRpcError>>,
    switch_error: RefCell<Option<ProviderRpcError>>,
    approval_gate: RefCell<Option<oneshot::Receiver<()>>>,
    listeners: RefCell<Vec<(ListenerId, EventListener)>>,
    next_listener: Cell<ListenerId>,
    account_requests: Cell<u32>,
    switch_requests: Cell<u32>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// One account on Ethereum Mainnet; the wallet also knows Sepolia and
    /// Ganache.
    pub fn new() -> Self {
        Self {
            accounts: RefCell::new(vec![Address::from(DEFAULT_ACCOUNT)]),
            authorized: Cell::new(false),
            chain_id: Cell::new(ChainId::ETHEREUM_MAINNET),
            wallet_chains: RefCell::new(vec![
                ChainId::ETHEREUM_MAINNET,
                ChainId::SEPOLIA,
                ChainId::GANACHE,
            ]),
            emit_on_switch: Cell::new(false),
            connect_error: RefCell::new(None),
            switch_error: RefCell::new(None),
            approval_gate: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            account_requests: Cell::new(0),
            switch_requests: Cell::new(0),
        }
    }

    pub fn with_accounts(self, accounts: impl IntoIterator<Item = Address>) -> Self {
        *self.accounts.borrow_mut() = accounts.into_iter().collect();
        self
    }

    pub fn with_chain(self, chain_id: ChainId) -> Self {
        self.chain_id.set(chain_id);
        self
    }

    /// Accounts are visible to `eth_accounts` without a prompt.
    pub fn pre_authorized(self) -> Self {
        self.authorized.set(true);
        self
    }

    /// Emit `chainChanged` after a successful switch, as real wallets do.
    pub fn with_switch_events(self) -> Self {
        self.emit_on_switch.set(true);
        self
    }

    /// The next `eth_requestAccounts` fails with `error`.
    pub fn fail_next_connect(&self, error: ProviderRpcError) {
        *self.connect_error.borrow_mut() = Some(error);
    }

    /// The next `wallet_switchEthereumChain` fails with `error`.
    pub fn fail_next_switch(&self, error: ProviderRpcError) {
        *self.switch_error.borrow_mut() = Some(error);
    }

    /// Keep the next approval prompt open until the returned sender fires
    /// (or is dropped).
    pub fn hold_approval(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.approval_gate.borrow_mut() = Some(rx);
        tx
    }

    /// Deliver `event` to every registered listener.
    pub fn emit(&self, event: ProviderEvent) {
        if let ProviderEvent::ChainChanged(chain_id) = &event {
            self.chain_id.set(*chain_id);
        }
        let listeners: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn account_requests(&self) -> u32 {
        self.account_requests.get()
    }

    pub fn switch_requests(&self) -> u32 {
        self.switch_requests.get()
    }

    pub fn current_chain(&self) -> ChainId {
        self.chain_id.get()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        self.account_requests.set(self.account_requests.get() + 1);

        let gate = self.approval_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(error) = self.connect_error.borrow_mut().take() {
            return Err(error);
        }

        self.authorized.set(true);
        Ok(self.accounts.borrow().clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        if self.authorized.get() {
            Ok(self.accounts.borrow().clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        Ok(self.chain_id.get())
    }

    async fn switch_chain(&self, target: ChainId) -> Result<(), ProviderRpcError> {
        self.switch_requests.set(self.switch_requests.get() + 1);

        if let Some(error) = self.switch_error.borrow_mut().take() {
            return Err(error);
        }
        if !self.wallet_chains.borrow().contains(&target) {
            return Err(ProviderRpcError::new(
                codes::UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID \"{}\".", target.to_hex()),
            ));
        }

        if self.emit_on_switch.get() {
            self.emit(ProviderEvent::ChainChanged(target));
        } else {
            self.chain_id.set(target);
        }
        Ok(())
    }

    fn add_listener(&self, listener: EventListener) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .iter()
                .position(|(lid, _)| *lid == id)
                .map(|pos| listeners.remove(pos))
        };
        drop(removed);
    }
}
