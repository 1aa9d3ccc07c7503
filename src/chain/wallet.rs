use alloy_primitives::{Address, U256};
use futures::channel::mpsc;
use futures::Stream;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::contract::{ChainContract, MarketContract};
use super::transport::{BrowserRpc, Eip1193Transport, HttpTransport, RpcError, Transport};
use super::types::WalletEvent;
use crate::config::Settings;

/// The user's wallet: account access, native balance, change notifications,
/// and a signer-bound handle to the contract.
#[allow(async_fn_in_trait)]
pub trait Wallet {
    type Contract: MarketContract + Clone;
    type Events: Stream<Item = WalletEvent> + Unpin;

    /// Whether a wallet is present right now. Extensions may inject late.
    fn is_available(&self) -> bool;

    /// Start forwarding account / network changes. `None` without a wallet.
    fn subscribe(&self) -> Option<Self::Events>;

    /// Prompt for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError>;

    /// Accounts already exposed to this page, without prompting (`eth_accounts`).
    async fn authorized_accounts(&self) -> Result<Vec<Address>, RpcError>;

    async fn balance(&self, account: Address) -> Result<U256, RpcError>;

    /// Contract handle whose writes are signed by `signer`.
    fn bind(&self, contract: Address, signer: Address) -> Option<Self::Contract>;
}

/// Wallet backed by the extension injected at `window.ethereum`.
#[derive(Debug, Clone)]
pub struct BrowserWallet {
    reads: Option<HttpTransport>,
    receipt_poll: Duration,
}

impl BrowserWallet {
    pub fn new(settings: &Settings) -> Self {
        Self {
            reads: settings.rpc_url.as_deref().map(HttpTransport::new),
            receipt_poll: settings.receipt_poll,
        }
    }

    fn provider(&self) -> Result<Eip1193Transport, RpcError> {
        Eip1193Transport::detect().ok_or(RpcError::Unavailable)
    }

    async fn accounts(&self, method: &str) -> Result<Vec<Address>, RpcError> {
        let raw = self.provider()?.request(method, json!([])).await?;
        serde_json::from_value(raw).map_err(|e| RpcError::Malformed(e.to_string()))
    }
}

impl Wallet for BrowserWallet {
    type Contract = ChainContract<BrowserRpc>;
    type Events = mpsc::UnboundedReceiver<WalletEvent>;

    fn is_available(&self) -> bool {
        Eip1193Transport::detect().is_some()
    }

    fn subscribe(&self) -> Option<Self::Events> {
        Eip1193Transport::detect().map(|provider| provider.subscribe())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.accounts("eth_requestAccounts").await
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.accounts("eth_accounts").await
    }

    async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        let raw = self
            .provider()?
            .request("eth_getBalance", json!([account, "latest"]))
            .await?;
        serde_json::from_value(raw).map_err(|e| RpcError::Malformed(e.to_string()))
    }

    fn bind(&self, contract: Address, signer: Address) -> Option<Self::Contract> {
        let wallet = Eip1193Transport::detect()?;
        let reads = match &self.reads {
            Some(http) => BrowserRpc::Http(http.clone()),
            None => BrowserRpc::Wallet(wallet.clone()),
        };
        debug!(
            contract = %contract,
            signer = %signer,
            http_reads = self.reads.is_some(),
            "binding contract"
        );
        Some(ChainContract::new(
            contract,
            signer,
            reads,
            BrowserRpc::Wallet(wallet),
            self.receipt_poll,
        ))
    }
}
