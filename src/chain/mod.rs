//! Everything that crosses the wallet / contract boundary.
//!
//! - `abi`: `sol!` bindings for the fixed contract interface and event decoding
//! - `types`: read-only projections (`Market`, `UserPosition`, `Receipt`, ...)
//! - `transport`: JSON-RPC transports (injected EIP-1193 wallet, HTTP)
//! - `contract`: the `MarketContract` port and its JSON-RPC implementation
//! - `wallet`: the `Wallet` port and the browser implementation

pub mod abi;
pub mod contract;
pub mod transport;
pub mod types;
pub mod wallet;

pub use contract::{ChainContract, ContractError, MarketContract};
pub use transport::{RpcError, Transport};
pub use types::{ContractEvent, Market, PendingTx, Receipt, UserPosition, WalletEvent};
pub use wallet::{BrowserWallet, Wallet};
