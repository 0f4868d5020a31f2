//! Detection of an injected wallet provider.

use std::time::Duration;

use super::provider::ProviderHandle;
use crate::config::{DetectPoll, WalletConfig};

/// Best-effort probe for a wallet bridge.
///
/// Must be cheap, repeatable and infallible; `None` only means "no wallet".
pub trait ProviderDetector {
    fn detect(&self) -> Option<ProviderHandle>;
}

impl<F> ProviderDetector for F
where
    F: Fn() -> Option<ProviderHandle>,
{
    fn detect(&self) -> Option<ProviderHandle> {
        self()
    }
}

/// Looks for the provider the browser extension injects into `window`.
///
/// The wrapper is cached per injected object, so repeated `detect` calls hand
/// back the same handle for as long as the page keeps the same provider.
pub struct InjectedDetector {
    config: WalletConfig,
    #[cfg(target_arch = "wasm32")]
    cached: std::cell::RefCell<Option<std::rc::Rc<super::injected::InjectedProvider>>>,
}

impl InjectedDetector {
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            #[cfg(target_arch = "wasm32")]
            cached: std::cell::RefCell::new(None),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }
}

impl Default for InjectedDetector {
    fn default() -> Self {
        Self::new(WalletConfig::default())
    }
}

#[cfg(target_arch = "wasm32")]
impl ProviderDetector for InjectedDetector {
    fn detect(&self) -> Option<ProviderHandle> {
        use std::rc::Rc;
        use wasm_bindgen::JsValue;
        use web_sys::js_sys::{Object, Reflect};

        use super::injected::InjectedProvider;

        let window = web_sys::window()?;
        let object = Reflect::get(&window, &JsValue::from_str(&self.config.injection_key)).ok()?;
        if object.is_undefined() || object.is_null() {
            return None;
        }

        let capable = Reflect::get(&object, &JsValue::from_str(&self.config.capability_flag))
            .ok()
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false);
        if !capable {
            crate::log_debug!(
                "window.{} is present but does not set {}",
                self.config.injection_key,
                self.config.capability_flag
            );
            return None;
        }

        let mut cached = self.cached.borrow_mut();
        if let Some(existing) = cached.as_ref() {
            if Object::is(existing.object(), &object) {
                return Some(existing.clone() as ProviderHandle);
            }
        }

        let provider = Rc::new(InjectedProvider::new(object));
        *cached = Some(provider.clone());
        Some(provider as ProviderHandle)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ProviderDetector for InjectedDetector {
    fn detect(&self) -> Option<ProviderHandle> {
        // Outside a browser there is no `window` to inject into.
        None
    }
}

/// Re-probe until a provider shows up or `poll.timeout` elapses.
///
/// Used while the user installs the extension in another tab.
pub async fn wait_for_provider(
    detector: &dyn ProviderDetector,
    poll: DetectPoll,
) -> Option<ProviderHandle> {
    let mut waited = Duration::ZERO;
    loop {
        if let Some(provider) = detector.detect() {
            crate::log_info!("Wallet provider detected after {:?}", waited);
            return Some(provider);
        }
        if waited >= poll.timeout {
            crate::log_info!("No wallet provider after {:?}, giving up", poll.timeout);
            return None;
        }
        sleep(poll.interval).await;
        waited += poll.interval;
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::wallet::mock::MockProvider;

    #[test]
    fn injected_detector_finds_nothing_natively() {
        let detector = InjectedDetector::default();
        assert!(detector.detect().is_none());
        assert!(detector.detect().is_none());
    }

    #[tokio::test]
    async fn wait_returns_once_provider_appears() {
        let probes = Cell::new(0u32);
        let provider: ProviderHandle = Rc::new(MockProvider::new());
        let detector = || -> Option<ProviderHandle> {
            probes.set(probes.get() + 1);
            if probes.get() >= 3 {
                Some(provider.clone())
            } else {
                None
            }
        };

        let poll = DetectPoll {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        };
        assert!(wait_for_provider(&detector, poll).await.is_some());
        assert_eq!(probes.get(), 3);
    }

    #[tokio::test]
    async fn wait_gives_up_after_timeout() {
        let probes = Cell::new(0u32);
        let detector = || -> Option<ProviderHandle> {
            probes.set(probes.get() + 1);
            None
        };

        let poll = DetectPoll {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(3),
        };
        assert!(wait_for_provider(&detector, poll).await.is_none());
        // Probes at 0, 1, 2 and 3 ms.
        assert_eq!(probes.get(), 4);
    }
}
