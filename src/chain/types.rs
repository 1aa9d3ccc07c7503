//! Read-only projections of contract state and wallet notifications.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::Deserialize;

use super::abi;

/// One market as reported by `getMarket`. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub id: u64,
    pub question: String,
    /// Unix seconds.
    pub end_time: u64,
    pub resolved: bool,
    pub outcome: bool,
    /// Wei staked on YES.
    pub yes_stake: U256,
    /// Wei staked on NO.
    pub no_stake: U256,
    pub active: bool,
}

impl Market {
    pub fn pool(&self) -> U256 {
        self.yes_stake.saturating_add(self.no_stake)
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.end_time
    }
}

/// A user's stake in one market, from `getUserPosition`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub yes_stake: U256,
    pub no_stake: U256,
    pub claimed: bool,
}

impl UserPosition {
    pub fn has_stake(&self) -> bool {
        !self.yes_stake.is_zero() || !self.no_stake.is_zero()
    }
}

/// A submitted transaction that has not been confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

/// Subset of `eth_getTransactionReceipt` we act on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    /// `0x1` success, `0x0` revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }

    /// Decoded events emitted by `contract` in this transaction.
    pub fn events(&self, contract: Address) -> Vec<ContractEvent> {
        self.logs
            .iter()
            .filter(|log| log.address == contract)
            .filter_map(abi::decode_log)
            .collect()
    }
}

/// Events of the prediction market contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    MarketCreated {
        market_id: u64,
    },
    BetPlaced {
        market_id: u64,
        user: Address,
        prediction: bool,
        amount: U256,
    },
    MarketResolved {
        market_id: u64,
        outcome: bool,
    },
    WinningsClaimed {
        market_id: u64,
        user: Address,
        amount: U256,
    },
}

impl std::fmt::Display for ContractEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MarketCreated { market_id } => write!(f, "MarketCreated(#{market_id})"),
            Self::BetPlaced { market_id, prediction, amount, .. } => {
                write!(f, "BetPlaced(#{market_id}, yes={prediction}, wei={amount})")
            }
            Self::MarketResolved { market_id, outcome } => {
                write!(f, "MarketResolved(#{market_id}, yes={outcome})")
            }
            Self::WinningsClaimed { market_id, amount, .. } => {
                write!(f, "WinningsClaimed(#{market_id}, wei={amount})")
            }
        }
    }
}

/// Notifications pushed by the wallet extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of exposed accounts changed. Empty = locked or disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks. Carries the new chain id as reported.
    ChainChanged(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_status() {
        let receipt: Receipt = serde_json::from_value(serde_json::json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "status": "0x0",
            "logs": []
        }))
        .unwrap();
        assert!(!receipt.succeeded());

        let legacy: Receipt = serde_json::from_value(serde_json::json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
        }))
        .unwrap();
        assert!(legacy.succeeded());
    }

    #[test]
    fn test_event_log_lines() {
        let bet = ContractEvent::BetPlaced {
            market_id: 2,
            user: Address::ZERO,
            prediction: true,
            amount: U256::from(500u64),
        };
        assert_eq!(bet.to_string(), "BetPlaced(#2, yes=true, wei=500)");
        let resolved = ContractEvent::MarketResolved { market_id: 2, outcome: false };
        assert_eq!(resolved.to_string(), "MarketResolved(#2, yes=false)");
    }

    #[test]
    fn test_market_end_boundary() {
        let market = Market {
            id: 0,
            question: "Will it rain?".to_string(),
            end_time: 1_000,
            resolved: false,
            outcome: false,
            yes_stake: U256::from(3u8),
            no_stake: U256::from(4u8),
            active: true,
        };
        assert!(!market.has_ended(999));
        assert!(market.has_ended(1_000));
        assert_eq!(market.pool(), U256::from(7u8));
    }
}
