//! BlockVote client - wallet session core and Dioxus web front end
//!
//! The `wallet` module is platform independent and is what the tests drive.
//! Components and stores only build for the browser.

#[macro_use]
pub mod logging;

pub mod config;
pub mod wallet;

#[cfg(target_arch = "wasm32")]
pub mod components;
#[cfg(target_arch = "wasm32")]
pub mod stores;
#[cfg(target_arch = "wasm32")]
pub mod wallet_context;

pub use config::{DetectPoll, WalletConfig};
pub use wallet::{ChainScoped, SessionStore, Subscription, WalletController};
#[cfg(target_arch = "wasm32")]
pub use wallet_context::{use_wallet, WalletContext, WalletProvider};
