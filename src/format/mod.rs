//! Display helpers for chain-native values.
//!
//! Amounts are wei (`U256`, 18 decimals) and are rounded with integer math
//! so that display values never drift from what the contract holds.

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use chrono::{Local, TimeZone};
use std::fmt::Display;

const WEI_DECIMALS: u32 = 18;

/// `0x3353E8557e63bd506d54AdDa7daB122aBc5a5b67` → `0x3353...5b67`.
pub fn format_address(address: &Address) -> String {
    let checksummed = address.to_checksum(None);
    format!(
        "{}...{}",
        &checksummed[..6],
        &checksummed[checksummed.len() - 4..]
    )
}

/// Wei → ether units with exactly `decimals` places, rounded half-up.
pub fn format_amount(amount: U256, decimals: u32) -> String {
    let decimals = decimals.min(WEI_DECIMALS);
    let step = U256::from(10u64.pow(WEI_DECIMALS - decimals));
    let scaled = amount.saturating_add(step / U256::from(2u8)) / step;
    if decimals == 0 {
        return scaled.to_string();
    }

    let unit = U256::from(10u64.pow(decimals));
    let whole = scaled / unit;
    let frac = (scaled % unit).to_string();
    let padding = "0".repeat(decimals as usize - frac.len());
    format!("{whole}.{padding}{frac}")
}

pub fn format_balance(balance: U256, symbol: &str) -> String {
    format!("{} {symbol}", format_amount(balance, 2))
}

/// Unix seconds → local wall-clock time, e.g. `3/14/2025, 9:05:00 PM`.
pub fn format_date(unix_secs: u64) -> String {
    format_date_in(unix_secs, &Local)
}

pub fn format_date_in<Tz>(unix_secs: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Ok(secs) = i64::try_from(unix_secs) else {
        return unix_secs.to_string();
    };
    match tz.timestamp_opt(secs, 0).single() {
        Some(at) => at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => unix_secs.to_string(),
    }
}

/// Ether-unit text (`"0.25"`) → wei. `None` for empty, negative or malformed input.
pub fn parse_amount(text: &str) -> Option<U256> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('-') {
        return None;
    }
    parse_ether(text).ok()
}
