use alloy_primitives::U256;

use crate::format::format_amount;

/// Owner-only panel: collected fees and the withdraw action.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub fees_label: String,
}

impl AdminView {
    /// `fees` is `None` until the first `collectedFees` read completes.
    pub fn new(fees: Option<U256>, symbol: &str) -> Self {
        let fees_label = match fees {
            Some(fees) => format!("{} {symbol}", format_amount(fees, 4)),
            None => format!("0.0 {symbol}"),
        };
        Self { fees_label }
    }
}
