//! `window.ethereum` wrapper (browser only).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use blockvote_shared::{
    codes, decode_accounts, decode_chain_id, Address, ChainId, ProviderEvent, ProviderEventKind,
    ProviderRpcError, RpcMethod, RpcRequest,
};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Function, Promise, Reflect, JSON};

use super::provider::{EventListener, ListenerId, WalletProvider};

type JsListener = Closure<dyn FnMut(JsValue)>;

/// An EIP-1193 provider object injected by a browser extension.
pub struct InjectedProvider {
    object: JsValue,
    listeners: RefCell<HashMap<ListenerId, Vec<(ProviderEventKind, JsListener)>>>,
    next_listener: Cell<ListenerId>,
}

impl InjectedProvider {
    pub fn new(object: JsValue) -> Self {
        Self {
            object,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    pub fn object(&self) -> &JsValue {
        &self.object
    }

    fn method(&self, name: &str) -> Result<Function, ProviderRpcError> {
        Reflect::get(&self.object, &JsValue::from_str(name))
            .map_err(|e| rpc_error_from_js(&e))?
            .dyn_into::<Function>()
            .map_err(|_| ProviderRpcError::internal(format!("provider.{} is not a function", name)))
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderRpcError> {
        let args = serde_json::to_string(&request)
            .map_err(|e| ProviderRpcError::internal(format!("Failed to encode request: {}", e)))?;
        let args = JSON::parse(&args).map_err(|e| rpc_error_from_js(&e))?;

        crate::log_debug!("provider.request({})", request.method);
        let returned = self
            .method("request")?
            .call1(&self.object, &args)
            .map_err(|e| rpc_error_from_js(&e))?;
        let result = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| rpc_error_from_js(&e))?;

        js_to_json(&result)
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        decode_accounts(self.request(RpcRequest::new(RpcMethod::RequestAccounts)).await?)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderRpcError> {
        decode_accounts(self.request(RpcRequest::new(RpcMethod::Accounts)).await?)
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        decode_chain_id(self.request(RpcRequest::new(RpcMethod::ChainId)).await?)
    }

    async fn switch_chain(&self, target: ChainId) -> Result<(), ProviderRpcError> {
        self.request(RpcRequest::switch_chain(target)).await?;
        Ok(())
    }

    fn add_listener(&self, listener: EventListener) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);

        let on = match self.method("on") {
            Ok(on) => on,
            Err(e) => {
                crate::log_error!("Cannot subscribe to provider events: {}", e);
                return id;
            }
        };

        let mut registered = Vec::new();
        for kind in ProviderEventKind::ALL {
            let listener = listener.clone();
            let closure = JsListener::new(move |payload: JsValue| {
                let event = js_to_json(&payload)
                    .map_err(|e| e.message)
                    .and_then(|value| ProviderEvent::decode(kind, value));
                match event {
                    Ok(event) => listener(event),
                    Err(e) => crate::log_warn!("Dropping malformed {} event: {}", kind.as_str(), e),
                }
            });

            let name = JsValue::from_str(kind.as_str());
            if let Err(e) = on.call2(&self.object, &name, closure.as_ref().unchecked_ref()) {
                crate::log_error!(
                    "provider.on({}) failed: {}",
                    kind.as_str(),
                    rpc_error_from_js(&e)
                );
                continue;
            }
            registered.push((kind, closure));
        }

        self.listeners.borrow_mut().insert(id, registered);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some(registered) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };

        if let Ok(remove) = self.method("removeListener") {
            for (kind, closure) in &registered {
                let name = JsValue::from_str(kind.as_str());
                if let Err(e) = remove.call2(&self.object, &name, closure.as_ref().unchecked_ref()) {
                    crate::log_warn!(
                        "provider.removeListener({}) failed: {}",
                        kind.as_str(),
                        rpc_error_from_js(&e)
                    );
                }
            }
        }

        // Removal can be triggered from inside one of these closures (an
        // `accountsChanged([])` ends the session), so they are freed on a
        // later tick rather than while one may still be running.
        wasm_bindgen_futures::spawn_local(async move {
            drop(registered);
        });
    }
}

/// Build an error from whatever a provider threw or rejected with.
fn rpc_error_from_js(value: &JsValue) -> ProviderRpcError {
    let code = Reflect::get(value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(codes::INTERNAL);
    let message = Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    ProviderRpcError::new(code, message)
}

fn js_to_json(value: &JsValue) -> Result<Value, ProviderRpcError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text = JSON::stringify(value)
        .map_err(|e| rpc_error_from_js(&e))?
        .as_string()
        .unwrap_or_default();
    serde_json::from_str(&text)
        .map_err(|e| ProviderRpcError::internal(format!("Unreadable provider value: {}", e)))
}
