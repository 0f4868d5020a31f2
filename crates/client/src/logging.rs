//! Cross-platform logging.
//!
//! The `log_*!` macros format their arguments and hand them to [`emit`],
//! which writes to `web_sys::console` in the browser and to `tracing`
//! everywhere else.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(target_arch = "wasm32")]
pub fn emit(level: Level, msg: &str) {
    let value = wasm_bindgen::JsValue::from_str(&format!("[wallet] {}", msg));
    match level {
        Level::Debug => web_sys::console::debug_1(&value),
        Level::Info => web_sys::console::log_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Error => web_sys::console::error_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(level: Level, msg: &str) {
    match level {
        Level::Debug => tracing::debug!(target: "blockvote_client::wallet", "{}", msg),
        Level::Info => tracing::info!(target: "blockvote_client::wallet", "{}", msg),
        Level::Warn => tracing::warn!(target: "blockvote_client::wallet", "{}", msg),
        Level::Error => tracing::error!(target: "blockvote_client::wallet", "{}", msg),
    }
}

/// Install the native `tracing` subscriber. `RUST_LOG` overrides the default
/// `blockvote_client=debug` filter. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blockvote_client=debug")),
        )
        .try_init();
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Debug, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Error, &format!($($arg)*))
    };
}
