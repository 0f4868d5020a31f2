//! EIP-1193 provider vocabulary: request methods, events and their payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderRpcError;
use crate::models::{Address, ChainId};

/// Provider methods used by the wallet core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    /// Prompts the user to authorize accounts.
    RequestAccounts,
    /// Already-authorized accounts, never prompts.
    Accounts,
    ChainId,
    SwitchChain,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RpcMethod::RequestAccounts => "eth_requestAccounts",
            RpcMethod::Accounts => "eth_accounts",
            RpcMethod::ChainId => "eth_chainId",
            RpcMethod::SwitchChain => "wallet_switchEthereumChain",
        }
    }
}

/// Argument object passed to `provider.request(...)`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcRequest {
    pub method: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: RpcMethod) -> Self {
        Self {
            method: method.as_str(),
            params: Vec::new(),
        }
    }

    pub fn switch_chain(target: ChainId) -> Self {
        let params = SwitchChainParams {
            chain_id: target.to_hex(),
        };
        Self {
            method: RpcMethod::SwitchChain.as_str(),
            params: vec![serde_json::json!(params)],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

/// Names of the provider events the bridge listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Disconnect,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 3] = [
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::ChainChanged,
        ProviderEventKind::Disconnect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
            ProviderEventKind::Disconnect => "disconnect",
        }
    }
}

/// An event pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
    Disconnect(Option<ProviderRpcError>),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
            ProviderEvent::Disconnect(_) => ProviderEventKind::Disconnect,
        }
    }

    /// Decode an event payload as the provider delivered it.
    pub fn decode(kind: ProviderEventKind, payload: Value) -> Result<Self, String> {
        match kind {
            ProviderEventKind::AccountsChanged => {
                let accounts: Vec<Address> = serde_json::from_value(payload)
                    .map_err(|e| format!("Invalid accountsChanged payload: {}", e))?;
                Ok(ProviderEvent::AccountsChanged(accounts))
            }
            ProviderEventKind::ChainChanged => {
                let chain_id = match &payload {
                    Value::String(raw) => ChainId::from_hex(raw).map_err(|e| e.to_string())?,
                    Value::Number(n) => n
                        .as_u64()
                        .and_then(ChainId::new)
                        .ok_or_else(|| format!("Invalid chain id: {}", n))?,
                    other => return Err(format!("Invalid chainChanged payload: {}", other)),
                };
                Ok(ProviderEvent::ChainChanged(chain_id))
            }
            ProviderEventKind::Disconnect => {
                Ok(ProviderEvent::Disconnect(serde_json::from_value(payload).ok()))
            }
        }
    }
}

/// Decode an `eth_requestAccounts` / `eth_accounts` result.
pub fn decode_accounts(result: Value) -> Result<Vec<Address>, ProviderRpcError> {
    serde_json::from_value(result)
        .map_err(|e| ProviderRpcError::internal(format!("Invalid accounts response: {}", e)))
}

/// Decode an `eth_chainId` result.
pub fn decode_chain_id(result: Value) -> Result<ChainId, ProviderRpcError> {
    match result {
        Value::String(raw) => ChainId::from_hex(&raw)
            .map_err(|e| ProviderRpcError::internal(format!("Invalid chain id: {}", e))),
        other => Err(ProviderRpcError::internal(format!(
            "Invalid eth_chainId response: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn switch_request_carries_hex_chain() {
        let req = RpcRequest::switch_chain(ChainId::new(11_155_111).unwrap());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "method": "wallet_switchEthereumChain", "params": [{ "chainId": "0xaa36a7" }] })
        );
        assert_eq!(
            serde_json::to_value(RpcRequest::new(RpcMethod::ChainId)).unwrap(),
            json!({ "method": "eth_chainId" })
        );
    }

    #[test]
    fn decodes_event_payloads() {
        assert_eq!(
            ProviderEvent::decode(ProviderEventKind::AccountsChanged, json!(["0xabc"])).unwrap(),
            ProviderEvent::AccountsChanged(vec![Address::from("0xabc")])
        );
        assert_eq!(
            ProviderEvent::decode(ProviderEventKind::AccountsChanged, json!([])).unwrap(),
            ProviderEvent::AccountsChanged(vec![])
        );
        assert_eq!(
            ProviderEvent::decode(ProviderEventKind::ChainChanged, json!("0xaa36a7")).unwrap(),
            ProviderEvent::ChainChanged(ChainId::new(11_155_111).unwrap())
        );
        assert!(ProviderEvent::decode(ProviderEventKind::ChainChanged, json!(null)).is_err());
    }

    #[test]
    fn disconnect_payload_is_optional() {
        let with_error = ProviderEvent::decode(
            ProviderEventKind::Disconnect,
            json!({ "code": 4900, "message": "Disconnected" }),
        )
        .unwrap();
        assert_eq!(
            with_error,
            ProviderEvent::Disconnect(Some(ProviderRpcError::new(4900, "Disconnected")))
        );
        assert_eq!(
            ProviderEvent::decode(ProviderEventKind::Disconnect, Value::Null).unwrap(),
            ProviderEvent::Disconnect(None)
        );
    }

    #[test]
    fn decodes_request_results() {
        assert_eq!(
            decode_chain_id(json!("0x1")).unwrap(),
            ChainId::new(1).unwrap()
        );
        assert!(decode_chain_id(json!(1)).is_err());
        assert!(decode_accounts(json!("0xabc")).is_err());
    }
}
