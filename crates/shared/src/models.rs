//! Shared data models for wallet sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChainIdParseError;

// --- Identity ---

/// A wallet address as reported by the provider.
///
/// The string is kept exactly as the wallet returned it (usually the
/// EIP-55 checksummed form); nothing here validates or re-cases it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form `0x1234...abcd` (first six, last four characters).
    ///
    /// Strings too short to benefit from truncation are returned unchanged.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// --- Networks ---

/// Identifier of an EVM network. Always non-zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u64", into = "u64")]
pub struct ChainId(u64);

impl ChainId {
    pub const fn new(id: u64) -> Option<Self> {
        if id == 0 {
            None
        } else {
            Some(Self(id))
        }
    }

    pub const ETHEREUM_MAINNET: ChainId = ChainId(1);
    pub const SEPOLIA: ChainId = ChainId(11_155_111);
    pub const GANACHE: ChainId = ChainId(5777);

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse the `0x`-prefixed hex quantity wallets put on the wire
    /// (`eth_chainId`, `chainChanged`). A bare decimal string is accepted too,
    /// since some providers emit `net_version`-style values.
    pub fn from_hex(raw: &str) -> Result<Self, ChainIdParseError> {
        let raw = raw.trim();
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(digits) => u64::from_str_radix(digits, 16),
            None => raw.parse::<u64>(),
        }
        .map_err(|_| ChainIdParseError::Malformed(raw.to_string()))?;

        Self::new(parsed).ok_or(ChainIdParseError::Zero)
    }

    /// Hex quantity form (`0xaa36a7`), as `wallet_switchEthereumChain` expects.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<u64> for ChainId {
    type Error = ChainIdParseError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id).ok_or(ChainIdParseError::Zero)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

// --- Session ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// The authorized account and the chain it is on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub account: Address,
    pub chain_id: ChainId,
}

/// Wallet session as seen by every consumer.
///
/// Only `Connected` carries an account and a chain id, so a half-populated
/// session cannot be represented.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected(ActiveSession),
}

impl SessionState {
    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        SessionState::Connected(ActiveSession { account, chain_id })
    }

    pub fn status(&self) -> ConnectionStatus {
        match self {
            SessionState::Disconnected => ConnectionStatus::Disconnected,
            SessionState::Connecting => ConnectionStatus::Connecting,
            SessionState::Connected(_) => ConnectionStatus::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, SessionState::Connecting)
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Connected(active) => Some(active),
            _ => None,
        }
    }

    pub fn account(&self) -> Option<&Address> {
        self.active().map(|s| &s.account)
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.active().map(|s| s.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_keeps_head_and_tail() {
        let addr = Address::new("0xABCD00000000000000000000000000000000001234");
        assert_eq!(addr.short(), "0xABCD...1234");
    }

    #[test]
    fn short_address_leaves_tiny_strings_alone() {
        assert_eq!(Address::new("0x1234").short(), "0x1234");
    }

    #[test]
    fn chain_id_parses_hex_and_decimal() {
        assert_eq!(ChainId::from_hex("0x1").unwrap().get(), 1);
        assert_eq!(ChainId::from_hex("0xaa36a7").unwrap().get(), 11_155_111);
        assert_eq!(ChainId::from_hex("5777").unwrap().get(), 5777);
        assert_eq!(ChainId::new(11_155_111).unwrap().to_hex(), "0xaa36a7");
    }

    #[test]
    fn chain_id_rejects_zero_and_garbage() {
        assert_eq!(ChainId::from_hex("0x0"), Err(ChainIdParseError::Zero));
        assert!(matches!(
            ChainId::from_hex("0xzz"),
            Err(ChainIdParseError::Malformed(_))
        ));
        assert!(ChainId::from_hex("").is_err());
        assert!(serde_json::from_str::<ChainId>("0").is_err());
    }

    #[test]
    fn only_connected_carries_account_and_chain() {
        let states = [
            SessionState::Disconnected,
            SessionState::Connecting,
            SessionState::connected(Address::from("0xabc"), ChainId::new(1).unwrap()),
        ];
        for state in states {
            let connected = state.status() == ConnectionStatus::Connected;
            assert_eq!(state.account().is_some(), connected);
            assert_eq!(state.chain_id().is_some(), connected);
        }
    }

    #[test]
    fn session_serializes_with_status_tag() {
        let state = SessionState::connected(Address::from("0xabc"), ChainId::new(1).unwrap());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "connected");
        assert_eq!(json["account"], "0xabc");
        assert_eq!(json["chainId"], 1);
    }
}
