use dioxus::prelude::*;

use crate::components::ui::{Button, ButtonVariant};
use crate::wallet_context::use_wallet;

/// Header widget: a connect button, or the connected account and network.
#[component]
pub fn WalletBadge() -> Element {
    let wallet = use_wallet();

    if !wallet.is_connected() && !wallet.provider_available() {
        return rsx! { InstallPrompt {} };
    }

    if wallet.is_connecting() {
        return rsx! {
            Button { variant: ButtonVariant::Outline, disabled: true, "Connecting..." }
        };
    }

    match (wallet.account(), wallet.network_name()) {
        (Some(account), Some(network)) => {
            let short = account.short();
            rsx! {
                div { class: "flex items-center gap-3",
                    span { class: "rounded-full bg-gray-800 px-3 py-1 text-xs text-gray-300", "{network}" }
                    span { class: "font-mono text-sm text-white", title: "{account}", "{short}" }
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| wallet.disconnect(),
                        "Disconnect"
                    }
                }
            }
        }
        _ => rsx! {
            Button { onclick: move |_| wallet.connect(), "Connect MetaMask" }
        },
    }
}

/// Shown when no wallet extension is present.
#[component]
fn InstallPrompt() -> Element {
    let wallet = use_wallet();
    let install_url = wallet.install_url();
    let installing = (wallet.installing)();

    rsx! {
        div { class: "flex items-center gap-3",
            a {
                class: "text-sm text-indigo-400 underline",
                href: "{install_url}",
                target: "_blank",
                rel: "noopener noreferrer",
                onclick: move |_| wallet.watch_for_install(),
                "Install MetaMask"
            }
            if installing {
                span { class: "text-xs text-gray-400", "Waiting for the extension..." }
            }
        }
    }
}
