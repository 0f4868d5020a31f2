//! Static registry of the networks BlockVote knows how to label.
//!
//! A chain id missing from this table is a legitimate "unknown network"
//! state; callers fall back to [`UNKNOWN_NETWORK`] for display.

use crate::models::ChainId;

pub const UNKNOWN_NETWORK: &str = "Unknown Network";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: ChainId,
    pub display_name: &'static str,
    pub explorer_url: &'static str,
    pub rpc_url: &'static str,
}

impl NetworkDescriptor {
    /// The `0x`-hex form a wallet expects in `wallet_switchEthereumChain`.
    pub fn chain_id_hex(&self) -> String {
        self.chain_id.to_hex()
    }
}

static NETWORKS: [NetworkDescriptor; 3] = [
    NetworkDescriptor {
        chain_id: ChainId::ETHEREUM_MAINNET,
        display_name: "Ethereum Mainnet",
        explorer_url: "https://etherscan.io",
        rpc_url: "https://mainnet.infura.io/v3/",
    },
    NetworkDescriptor {
        chain_id: ChainId::SEPOLIA,
        display_name: "Sepolia Testnet",
        explorer_url: "https://sepolia.etherscan.io",
        rpc_url: "https://sepolia.infura.io/v3/",
    },
    NetworkDescriptor {
        chain_id: ChainId::GANACHE,
        display_name: "Ganache Local",
        explorer_url: "http://localhost:7545",
        rpc_url: "http://127.0.0.1:7545",
    },
];

/// Look up a chain by id.
pub fn resolve(chain_id: ChainId) -> Option<&'static NetworkDescriptor> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Every supported network, in switcher display order.
pub fn supported() -> &'static [NetworkDescriptor] {
    &NETWORKS
}

/// Display name for a chain, or [`UNKNOWN_NETWORK`].
pub fn display_name(chain_id: ChainId) -> &'static str {
    resolve(chain_id)
        .map(|n| n.display_name)
        .unwrap_or(UNKNOWN_NETWORK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: u64) -> ChainId {
        ChainId::new(id).unwrap()
    }

    #[test]
    fn resolves_known_networks() {
        assert_eq!(resolve(chain(1)).unwrap().display_name, "Ethereum Mainnet");
        let sepolia = resolve(chain(11_155_111)).unwrap();
        assert_eq!(sepolia.display_name, "Sepolia Testnet");
        assert_eq!(sepolia.explorer_url, "https://sepolia.etherscan.io");
        assert_eq!(sepolia.chain_id_hex(), "0xaa36a7");
        assert_eq!(resolve(chain(5777)).unwrap().chain_id_hex(), "0x1691");
    }

    #[test]
    fn unknown_chain_is_not_an_error() {
        assert!(resolve(chain(999)).is_none());
        assert_eq!(display_name(chain(999)), UNKNOWN_NETWORK);
    }

    #[test]
    fn table_has_unique_ids() {
        let ids: std::collections::HashSet<_> = supported().iter().map(|n| n.chain_id).collect();
        assert_eq!(ids.len(), supported().len());
    }

    #[test]
    fn lookup_is_usable_across_threads() {
        let handle = std::thread::spawn(|| display_name(chain(1)));
        assert_eq!(handle.join().unwrap(), "Ethereum Mainnet");
    }
}
