//! JSON-RPC transports.
//!
//! - `Eip1193Transport`: the wallet injected at `window.ethereum`. Signs
//!   and broadcasts; also answers reads.
//! - `HttpTransport`: a plain JSON-RPC endpoint over `reqwest`, used for
//!   read-only calls when `network.rpc_url` is configured.

use alloy_primitives::Address;
use futures::channel::mpsc;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::types::WalletEvent;

/// EIP-1193 "User Rejected Request".
const CODE_USER_REJECTED: i64 = 4001;
/// Non-standard but universal "request already pending" code.
const CODE_REQUEST_PENDING: i64 = -32002;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("no browser wallet detected")]
    Unavailable,
    #[error("user rejected the request")]
    Rejected,
    #[error("a request is already pending in the wallet")]
    Pending,
    #[error("{message} (code {code})")]
    Remote { code: i64, message: String },
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RpcError {
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            CODE_USER_REJECTED => RpcError::Rejected,
            CODE_REQUEST_PENDING => RpcError::Pending,
            _ => RpcError::Remote { code, message: message.into() },
        }
    }

    /// Map a rejected JS promise (`{ code, message }` or anything else).
    fn from_js(err: JsValue) -> Self {
        let code = js_sys::Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|v| v.as_f64());
        let message = js_sys::Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|v| v.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| format!("{err:?}"));
        match code {
            Some(code) => RpcError::from_code(code as i64, message),
            None => RpcError::Transport(message),
        }
    }
}

/// A JSON-RPC request/response channel.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[wasm_bindgen]
extern "C" {
    /// The EIP-1193 provider object a wallet extension injects.
    #[wasm_bindgen(extends = js_sys::Object)]
    #[derive(Debug, Clone)]
    pub type Ethereum;

    #[wasm_bindgen(method, catch)]
    fn request(this: &Ethereum, args: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Ethereum, event: &str, listener: &js_sys::Function);
}

#[derive(Debug, Clone)]
pub struct Eip1193Transport {
    provider: Ethereum,
}

impl Eip1193Transport {
    /// The wallet currently injected into the page, if any. Extensions may
    /// inject late, so callers re-check rather than cache.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let value = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        Some(Self { provider: value.unchecked_into() })
    }

    /// Forward `accountsChanged` / `chainChanged` into a channel. The JS
    /// listeners live for the rest of the page.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded();

        let accounts_tx = tx.clone();
        let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
            let accounts = parse_accounts(&accounts);
            debug!(count = accounts.len(), "wallet accounts changed");
            let _ = accounts_tx.unbounded_send(WalletEvent::AccountsChanged(accounts));
        });
        self.provider.on("accountsChanged", on_accounts.as_ref().unchecked_ref());
        on_accounts.forget();

        let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |chain: JsValue| {
            let chain = chain.as_string().unwrap_or_default();
            debug!(chain = %chain, "wallet network changed");
            let _ = tx.unbounded_send(WalletEvent::ChainChanged(chain));
        });
        self.provider.on("chainChanged", on_chain.as_ref().unchecked_ref());
        on_chain.forget();

        rx
    }
}

impl Transport for Eip1193Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let args = json!({ "method": method, "params": params }).to_string();
        let args = js_sys::JSON::parse(&args).map_err(|e| RpcError::Malformed(format!("{e:?}")))?;
        let promise = self.provider.request(&args).map_err(RpcError::from_js)?;
        let result = JsFuture::from(promise).await.map_err(RpcError::from_js)?;
        js_to_json(&result)
    }
}

fn js_to_json(value: &JsValue) -> Result<Value, RpcError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = js_sys::JSON::stringify(value)
        .map_err(|e| RpcError::Malformed(format!("{e:?}")))?
        .into();
    serde_json::from_str(&text).map_err(|e| RpcError::Malformed(e.to_string()))
}

fn parse_accounts(value: &JsValue) -> Vec<Address> {
    match js_to_json(value).and_then(|v| {
        serde_json::from_value::<Vec<Address>>(v).map_err(|e| RpcError::Malformed(e.to_string()))
    }) {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "unreadable accountsChanged payload");
            Vec::new()
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(err) => Err(RpcError::from_code(err.code, err.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| RpcError::Malformed(e.to_string()))?;
        body.into_result()
    }
}

/// Transport picked per request kind by `BrowserWallet`.
#[derive(Debug, Clone)]
pub enum BrowserRpc {
    Wallet(Eip1193Transport),
    Http(HttpTransport),
}

impl Transport for BrowserRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match self {
            BrowserRpc::Wallet(wallet) => wallet.request(method, params).await,
            BrowserRpc::Http(http) => http.request(method, params).await,
        }
    }
}
