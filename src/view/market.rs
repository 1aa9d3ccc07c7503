//! Market card derivation.
//!
//! A card shows exactly one of three action sets, chosen by status with
//! precedence resolved > ended > active:
//!   - resolved: claim / claimed indicator (inside the position block)
//!   - ended, unresolved: resolve controls (owner only)
//!   - active: betting controls

use alloy_primitives::{Address, U256};

use crate::chain::{Market, UserPosition};
use crate::format::{format_amount, format_date};

/// Tenths of a percent in a whole pool.
const PER_MILLE: u64 = 1_000;

/// Who is looking at the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub address: Option<Address>,
    /// Advisory only: the contract enforces owner-only actions itself.
    pub is_owner: bool,
}

/// The viewer's stake in a market plus projected payouts that could be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Holding {
    pub position: UserPosition,
    pub if_yes: Option<U256>,
    pub if_no: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Active,
    AwaitingResolution,
    Resolved { outcome: bool },
}

impl MarketStatus {
    pub fn of(market: &Market, now: u64) -> Self {
        if market.resolved {
            MarketStatus::Resolved { outcome: market.outcome }
        } else if market.has_ended(now) {
            MarketStatus::AwaitingResolution
        } else {
            MarketStatus::Active
        }
    }

    pub fn label(self) -> String {
        match self {
            MarketStatus::Active => "Active".to_string(),
            MarketStatus::AwaitingResolution => "Ended - Awaiting Resolution".to_string(),
            MarketStatus::Resolved { outcome } => format!("Resolved: {}", side_label(outcome)),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            MarketStatus::Active => "status-active",
            MarketStatus::AwaitingResolution => "status-ended",
            MarketStatus::Resolved { .. } => "status-resolved",
        }
    }
}

pub fn side_label(yes: bool) -> &'static str {
    if yes {
        "YES"
    } else {
        "NO"
    }
}

/// Owner button text for resolving a market to `outcome`.
pub fn resolve_label(outcome: bool) -> String {
    format!("Resolve as {}", side_label(outcome))
}

/// Each side's share of the pool in tenths of a percent. YES is rounded
/// half-up and NO takes the complement, so the pair always sums to 1000.
/// An empty pool is an even split.
pub fn pool_odds(yes: U256, no: U256) -> (u64, u64) {
    let total = yes.saturating_add(no);
    if total.is_zero() {
        return (PER_MILLE / 2, PER_MILLE / 2);
    }
    let scaled = yes
        .saturating_mul(U256::from(PER_MILLE))
        .saturating_add(total / U256::from(2u8));
    let yes_share = (scaled / total).saturating_to::<u64>().min(PER_MILLE);
    (yes_share, PER_MILLE - yes_share)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolSide {
    pub amount_label: String,
    /// Share of the pool in tenths of a percent.
    pub odds: u64,
}

impl PoolSide {
    pub fn odds_label(&self) -> String {
        format!("{}.{}%", self.odds / 10, self.odds % 10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    /// Market not resolved yet.
    Open,
    Claimable,
    Claimed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub label: &'static str,
    pub payout_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub yes_label: String,
    pub no_label: String,
    pub projections: Vec<Projection>,
    pub claim: ClaimState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketView {
    pub id: u64,
    pub question: String,
    pub ends_label: String,
    pub status: MarketStatus,
    pub pool_label: String,
    pub yes: PoolSide,
    pub no: PoolSide,
    pub resolve_controls: bool,
    pub position: Option<PositionView>,
    pub betting: bool,
}

impl MarketView {
    pub fn derive(
        market: &Market,
        viewer: &Viewer,
        holding: Option<&Holding>,
        now: u64,
        symbol: &str,
    ) -> Self {
        let status = MarketStatus::of(market, now);
        let (yes_odds, no_odds) = pool_odds(market.yes_stake, market.no_stake);

        let position = holding
            .filter(|_| viewer.address.is_some())
            .filter(|h| h.position.has_stake())
            .map(|h| PositionView::derive(market, h, symbol));

        Self {
            id: market.id,
            question: market.question.clone(),
            ends_label: format_date(market.end_time),
            status,
            pool_label: format!("{} {symbol}", format_amount(market.pool(), 4)),
            yes: PoolSide {
                amount_label: format_amount(market.yes_stake, 4),
                odds: yes_odds,
            },
            no: PoolSide {
                amount_label: format_amount(market.no_stake, 4),
                odds: no_odds,
            },
            resolve_controls: viewer.is_owner && status == MarketStatus::AwaitingResolution,
            position,
            betting: status == MarketStatus::Active,
        }
    }
}

impl PositionView {
    fn derive(market: &Market, holding: &Holding, symbol: &str) -> Self {
        let mut projections = Vec::new();
        if !market.resolved && !market.pool().is_zero() {
            let sides = [
                (holding.position.yes_stake, holding.if_yes, "If YES wins"),
                (holding.position.no_stake, holding.if_no, "If NO wins"),
            ];
            for (stake, payout, label) in sides {
                if let (false, Some(payout)) = (stake.is_zero(), payout) {
                    projections.push(Projection {
                        label,
                        payout_label: format!("{} {symbol}", format_amount(payout, 4)),
                    });
                }
            }
        }

        let claim = match (market.resolved, holding.position.claimed) {
            (false, _) => ClaimState::Open,
            (true, false) => ClaimState::Claimable,
            (true, true) => ClaimState::Claimed,
        };

        Self {
            yes_label: format_amount(holding.position.yes_stake, 4),
            no_label: format_amount(holding.position.no_stake, 4),
            projections,
            claim,
        }
    }
}

/// Contents of the markets container.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketsView {
    /// No wallet connected.
    Disconnected,
    /// Connected, contract reports zero markets.
    Empty,
    /// Cards in market id order; inactive or unreadable markets are absent.
    Cards(Vec<MarketView>),
}

impl MarketsView {
    /// Icon and text for the empty-state placeholder.
    pub fn placeholder(&self) -> Option<(&'static str, &'static str)> {
        match self {
            MarketsView::Disconnected => Some(("🎯", "Connect your wallet to view markets")),
            MarketsView::Empty => Some(("📊", "No markets yet. Create the first one!")),
            MarketsView::Cards(_) => None,
        }
    }
}
