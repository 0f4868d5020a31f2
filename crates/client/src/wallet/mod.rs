//! Wallet session management.
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────────┐   detect()   ┌──────────────────┐
//!   │ ProviderDetector │ ───────────▶ │  WalletProvider  │  (window.ethereum)
//!   └──────────────────┘              └──────────────────┘
//!            ▲                           ▲            │ accountsChanged
//!            │                  requests │            │ chainChanged
//!            │                           │            ▼ disconnect
//!   ┌──────────────────────────────────────┐  ┌─────────────┐
//!   │          WalletController            │◀─│ EventBridge │
//!   └──────────────────────────────────────┘  └─────────────┘
//!                      │ set()
//!                      ▼
//!            ┌─────────────────────┐
//!            │    SessionStore     │ ──▶ subscribers (UI, ChainScoped caches)
//!            └─────────────────────┘
//! ```
//!
//! Consumers call the controller and read the store. They never talk to the
//! provider directly.

mod bridge;
mod chain_cache;
mod controller;
mod detector;
#[cfg(target_arch = "wasm32")]
mod injected;
pub mod mock;
mod provider;
mod store;

pub use bridge::EventBridge;
pub use chain_cache::{ChainScoped, ReadTicket};
pub use controller::{ConnectResult, WalletController};
pub use detector::{wait_for_provider, InjectedDetector, ProviderDetector};
#[cfg(target_arch = "wasm32")]
pub use injected::InjectedProvider;
pub use provider::{same_provider, EventListener, ListenerId, ProviderHandle, WalletProvider};
pub use store::{SessionStore, Subscription};
