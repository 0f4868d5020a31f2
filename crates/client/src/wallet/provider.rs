//! The seam between the wallet core and whatever the host injected.

use std::rc::Rc;

use async_trait::async_trait;
use blockvote_shared::{Address, ChainId, ProviderEvent, ProviderRpcError};

pub type ListenerId = u64;

/// Callback the provider invokes for every event it emits.
pub type EventListener = Rc<dyn Fn(ProviderEvent)>;

/// An EIP-1193 style wallet bridge.
///
/// Implementations are single-threaded: requests suspend on the host's event
/// loop and listeners are invoked from that same loop.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// `eth_requestAccounts`. May open the wallet's approval prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError>;

    /// `eth_accounts`. Never prompts; empty when nothing is authorized yet.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderRpcError>;

    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError>;

    /// `wallet_switchEthereumChain`. May prompt.
    async fn switch_chain(&self, target: ChainId) -> Result<(), ProviderRpcError>;

    /// Register for `accountsChanged`, `chainChanged` and `disconnect`.
    fn add_listener(&self, listener: EventListener) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

pub type ProviderHandle = Rc<dyn WalletProvider>;

/// Whether two handles refer to the same provider instance.
pub fn same_provider(a: &ProviderHandle, b: &ProviderHandle) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}
