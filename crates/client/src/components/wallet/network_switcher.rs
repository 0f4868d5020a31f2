use dioxus::prelude::*;
use blockvote_shared::networks;

use crate::components::ui::{Button, ButtonVariant};
use crate::wallet_context::use_wallet;

fn variant_for(active: bool) -> ButtonVariant {
    if active {
        ButtonVariant::Primary
    } else {
        ButtonVariant::Outline
    }
}

/// One button per supported network. Hidden while disconnected.
#[component]
pub fn NetworkSwitcher() -> Element {
    let wallet = use_wallet();
    let Some(current) = wallet.chain_id() else {
        return rsx! {};
    };

    rsx! {
        div { class: "flex gap-2",
            for network in networks::supported() {
                Button {
                    key: "{network.chain_id}",
                    variant: variant_for(network.chain_id == current),
                    disabled: network.chain_id == current,
                    onclick: move |_| wallet.switch_network(network.chain_id),
                    "{network.display_name}"
                }
            }
        }
    }
}
