use alloy_primitives::{Address, U256};

use crate::format::{format_address, format_balance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Offline,
    Online,
    /// Wallet connected but no contract address is configured.
    NoContract,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Offline => "Offline",
            ConnectionStatus::Online => "Online",
            ConnectionStatus::NoContract => "No Contract",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletView {
    pub address_label: String,
    pub balance_label: String,
    pub status: ConnectionStatus,
    pub connected: bool,
    pub owner_badge: bool,
}

impl WalletView {
    pub fn disconnected(symbol: &str) -> Self {
        Self {
            address_label: "Not Connected".to_string(),
            balance_label: format!("0.0 {symbol}"),
            status: ConnectionStatus::Offline,
            connected: false,
            owner_badge: false,
        }
    }

    pub fn connected(
        address: Address,
        balance: U256,
        status: ConnectionStatus,
        is_owner: bool,
        symbol: &str,
    ) -> Self {
        Self {
            address_label: format_address(&address),
            balance_label: format_balance(balance, symbol),
            status,
            connected: true,
            owner_badge: is_owner,
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.connected {
            "Connected"
        } else {
            "Connect Wallet"
        }
    }

    pub fn button_class(&self) -> &'static str {
        if self.connected {
            "btn btn-connected"
        } else {
            "btn btn-primary"
        }
    }
}
