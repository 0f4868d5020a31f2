//! Wallet detection configuration.

use std::time::Duration;

/// How long, and how often, to re-probe for a wallet the user is installing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectPoll {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for DetectPoll {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Property of `window` the provider is injected under.
    pub injection_key: String,
    /// Boolean flag the provider must set to be accepted (`isMetaMask`).
    pub capability_flag: String,
    /// Where the "install wallet" button sends the user.
    pub install_url: String,
    pub detect_poll: DetectPoll,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            injection_key: "ethereum".to_string(),
            capability_flag: "isMetaMask".to_string(),
            install_url: "https://metamask.io/download/".to_string(),
            detect_poll: DetectPoll::default(),
        }
    }
}
