//! Shared error types and the user-facing notices derived from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Address, ChainId};

/// EIP-1193 / EIP-1474 error codes the wallet core cares about.
pub mod codes {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// `wallet_switchEthereumChain` target is not configured in the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC internal error, used when a thrown value carries no code.
    pub const INTERNAL: i64 = -32603;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainIdParseError {
    #[error("chain id must be non-zero")]
    Zero,
    #[error("malformed chain id: {0:?}")]
    Malformed(String),
}

/// Error object a provider rejects a request with (`{ code, message }`).
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == codes::USER_REJECTED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == codes::UNRECOGNIZED_CHAIN
    }
}

/// Failures reported to wallet consumers. None of them are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("no wallet provider detected")]
    ProviderMissing,
    #[error("the user rejected the connection request")]
    UserRejected,
    #[error("the user rejected the network switch")]
    SwitchRejected,
    #[error("chain {0} is not configured in the wallet")]
    NetworkUnknownToWallet(ChainId),
    #[error("{0}")]
    ProviderError(String),
    #[error("the session was reset while the request was in flight")]
    Interrupted,
}

impl WalletError {
    /// Classify a rejected `eth_requestAccounts` / `eth_accounts` / `eth_chainId`.
    pub fn from_connect(err: ProviderRpcError) -> Self {
        if err.is_user_rejection() {
            WalletError::UserRejected
        } else {
            WalletError::ProviderError(err.message)
        }
    }

    /// Classify a rejected `wallet_switchEthereumChain`.
    pub fn from_switch(target: ChainId, err: ProviderRpcError) -> Self {
        if err.is_unrecognized_chain() {
            WalletError::NetworkUnknownToWallet(target)
        } else if err.is_user_rejection() {
            WalletError::SwitchRejected
        } else {
            WalletError::ProviderError(err.message)
        }
    }
}

// --- Notices ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Destructive,
}

/// A toast-style message for the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Destructive,
        }
    }

    pub fn connected(account: &Address) -> Self {
        Self::info("Wallet Connected", format!("Connected to {}", account.short()))
    }

    pub fn disconnected() -> Self {
        Self::info("Wallet Disconnected", "Your wallet has been disconnected.")
    }

    pub fn provider_detected() -> Self {
        Self::info("MetaMask Detected!", "You can now connect your wallet.")
    }
}

impl From<&WalletError> for Notice {
    fn from(err: &WalletError) -> Self {
        match err {
            WalletError::ProviderMissing => Notice::destructive(
                "MetaMask Not Found",
                "Please install MetaMask to use this application.",
            ),
            WalletError::UserRejected => {
                Notice::destructive("Connection Failed", "The connection request was rejected.")
            }
            WalletError::SwitchRejected => {
                Notice::destructive("Network Switch Failed", "The network switch was rejected.")
            }
            WalletError::NetworkUnknownToWallet(_) => Notice::destructive(
                "Network Not Found",
                "Please add this network to MetaMask manually.",
            ),
            WalletError::ProviderError(message) => {
                Notice::destructive("Connection Failed", message.clone())
            }
            WalletError::Interrupted => {
                Notice::info("Connection Cancelled", "The wallet was disconnected.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: u64) -> ChainId {
        ChainId::new(id).unwrap()
    }

    #[test]
    fn connect_errors_split_on_rejection_code() {
        let rejected = ProviderRpcError::new(codes::USER_REJECTED, "User denied");
        assert_eq!(WalletError::from_connect(rejected), WalletError::UserRejected);

        let other = ProviderRpcError::new(-32002, "Request already pending");
        assert_eq!(
            WalletError::from_connect(other),
            WalletError::ProviderError("Request already pending".into())
        );
    }

    #[test]
    fn switch_errors_recognize_unknown_chain() {
        let unknown = ProviderRpcError::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain");
        assert_eq!(
            WalletError::from_switch(chain(999), unknown),
            WalletError::NetworkUnknownToWallet(chain(999))
        );

        let declined = ProviderRpcError::new(codes::USER_REJECTED, "nope");
        assert_eq!(
            WalletError::from_switch(chain(1), declined),
            WalletError::SwitchRejected
        );
    }

    #[test]
    fn provider_errors_surface_verbatim() {
        let err = WalletError::ProviderError("Internal JSON-RPC error.".into());
        assert_eq!(err.to_string(), "Internal JSON-RPC error.");
        assert_eq!(Notice::from(&err).description, "Internal JSON-RPC error.");
    }

    #[test]
    fn missing_provider_notice_prompts_install() {
        let notice = Notice::from(&WalletError::ProviderMissing);
        assert_eq!(notice.title, "MetaMask Not Found");
        assert_eq!(notice.level, NoticeLevel::Destructive);
    }
}
