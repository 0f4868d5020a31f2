//! BlockVote client - Main entry point
//!
//! Runs in the browser, where the wallet extension lives.

#![allow(non_snake_case)]

#[cfg(target_arch = "wasm32")]
use blockvote_client::components::wallet::{NetworkSwitcher, NoticeList, WalletBadge};
#[cfg(target_arch = "wasm32")]
use blockvote_client::wallet_context::WalletProvider;
#[cfg(target_arch = "wasm32")]
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
fn main() {
    dioxus::launch(App);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    blockvote_client::logging::init();
    blockvote_client::log_error!(
        "blockvote-client needs a browser wallet; build it for wasm32 with `dx serve`"
    );
    std::process::exit(1);
}

#[cfg(target_arch = "wasm32")]
#[component]
fn App() -> Element {
    rsx! {
        WalletProvider {
            div { class: "min-h-screen bg-gray-900 text-white",
                header { class: "flex items-center justify-between border-b border-gray-800 px-6 py-4",
                    h1 { class: "text-lg font-bold", "BlockVote" }
                    WalletBadge {}
                }
                main { class: "px-6 py-4",
                    NetworkSwitcher {}
                }
                NoticeList {}
            }
        }
    }
}
