//! Wallet context for the Dioxus app.
//!
//! [`WalletProvider`] creates the one [`WalletController`] the app uses,
//! mirrors its session into a signal, and hands a [`WalletContext`] to every
//! component below it.

use std::cell::Cell;
use std::rc::Rc;

use blockvote_shared::{networks, ActiveSession, Address, ChainId, Notice, SessionState};
use dioxus::prelude::*;

use crate::config::WalletConfig;
use crate::stores::push_notice;
use crate::wallet::{wait_for_provider, InjectedDetector, ProviderDetector, WalletController};

/// Wallet state and actions available to components.
#[derive(Clone, Copy)]
pub struct WalletContext {
    pub session: Signal<SessionState>,
    /// True while waiting for the user to finish installing a wallet.
    pub installing: Signal<bool>,
    controller: CopyValue<WalletController>,
    detector: CopyValue<Rc<InjectedDetector>>,
}

/// Provider component that owns the wallet session.
#[component]
pub fn WalletProvider(children: Element) -> Element {
    let detector = use_hook(|| Rc::new(InjectedDetector::new(WalletConfig::default())));
    let controller = use_hook({
        let detector = detector.clone();
        move || WalletController::new(move || detector.detect())
    });

    let session = use_signal(|| controller.session());
    let installing = use_signal(|| false);

    // Mirror every store write into the signal, and announce sessions that end.
    use_hook({
        let controller = controller.clone();
        move || {
            let was_connected = Cell::new(controller.session().is_connected());
            Rc::new(controller.subscribe(move |state| {
                let mut session = session;
                session.set(state.clone());

                let now_connected = state.is_connected();
                if was_connected.replace(now_connected) && !now_connected {
                    push_notice(Notice::disconnected());
                }
            }))
        }
    });

    // Pick up a session the wallet already authorized.
    use_future({
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            async move {
                controller.restore().await;
            }
        }
    });

    use_drop({
        let controller = controller.clone();
        move || controller.stop_listening()
    });

    let context = use_hook(|| WalletContext {
        session,
        installing,
        controller: CopyValue::new(controller.clone()),
        detector: CopyValue::new(detector.clone()),
    });
    use_context_provider(|| context);

    children
}

/// The wallet context provided by [`WalletProvider`].
pub fn use_wallet() -> WalletContext {
    use_context::<WalletContext>()
}

impl WalletContext {
    pub fn is_connected(&self) -> bool {
        self.session.read().is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.session.read().is_connecting()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.read().account().cloned()
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.session.read().chain_id()
    }

    /// Display name of the current network; `None` when not connected.
    pub fn network_name(&self) -> Option<&'static str> {
        self.chain_id().map(networks::display_name)
    }

    /// Whether a wallet extension is present right now.
    pub fn provider_available(&self) -> bool {
        self.detector.cloned().detect().is_some()
    }

    pub fn install_url(&self) -> String {
        self.detector.cloned().config().install_url.clone()
    }

    pub fn connect(&self) {
        let controller = self.controller.cloned();
        spawn(async move {
            match controller.connect().await {
                Ok(ActiveSession { account, .. }) => push_notice(Notice::connected(&account)),
                Err(err) => push_notice(Notice::from(&err)),
            }
        });
    }

    pub fn disconnect(&self) {
        self.controller.cloned().disconnect();
    }

    pub fn switch_network(&self, target: ChainId) {
        let controller = self.controller.cloned();
        spawn(async move {
            if let Err(err) = controller.switch_network(target).await {
                push_notice(Notice::from(&err));
            }
        });
    }

    /// Poll for a wallet the user is installing in another tab.
    pub fn watch_for_install(&self) {
        let mut installing = self.installing;
        if *installing.peek() {
            return;
        }
        installing.set(true);

        let detector = self.detector.cloned();
        spawn(async move {
            let poll = detector.config().detect_poll;
            if wait_for_provider(&*detector, poll).await.is_some() {
                push_notice(Notice::provider_detected());
            }
            installing.set(false);
        });
    }
}
