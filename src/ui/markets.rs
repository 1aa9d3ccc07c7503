use dioxus::prelude::*;

use super::{PageController, Regions};
use crate::view::market::resolve_label;
use crate::view::{ClaimState, MarketView, MarketsView, PositionView};

/// Stake prefilled in each card's bet input.
const DEFAULT_BET: &str = "0.1";

#[component]
pub fn MarketsPanel() -> Element {
    let regions = use_context::<Regions>();
    let view = regions.markets.read().clone();

    if let Some((icon, text)) = view.placeholder() {
        return rsx! {
            div { class: "empty-state",
                div { class: "empty-state-icon", "{icon}" }
                p { "{text}" }
            }
        };
    }

    let MarketsView::Cards(cards) = view else {
        return None;
    };
    rsx! {
        div { class: "markets-grid",
            for card in cards {
                MarketCard { key: "{card.id}", card: card.clone() }
            }
        }
    }
}

#[component]
fn MarketCard(card: MarketView) -> Element {
    let id = card.id;
    let question = card.question.clone();
    let ends = card.ends_label.clone();
    let pool = card.pool_label.clone();
    let status_label = card.status.label();
    let status_class = card.status.css_class();
    let yes_amount = card.yes.amount_label.clone();
    let yes_odds = card.yes.odds_label();
    let no_amount = card.no.amount_label.clone();
    let no_odds = card.no.odds_label();

    let position = match card.position.clone() {
        Some(position) => rsx! { PositionPanel { market_id: id, position } },
        None => None,
    };
    let resolve = if card.resolve_controls {
        rsx! { ResolveControls { market_id: id } }
    } else {
        None
    };
    let betting = if card.betting {
        rsx! { BetControls { market_id: id } }
    } else {
        None
    };

    rsx! {
        div { class: "market-card",
            div { class: "market-header",
                div { class: "market-question", "{question}" }
                div { class: "status-badge {status_class}", "{status_label}" }
            }
            div { class: "market-meta",
                div { class: "meta-item", "Market #{id}" }
                div { class: "meta-item", "Ends: {ends}" }
                div { class: "meta-item", "Pool: {pool}" }
            }
            div { class: "pool-container",
                div { class: "pool-box pool-yes",
                    div { class: "pool-label", "YES" }
                    div { class: "pool-amount", "{yes_amount}" }
                    div { class: "pool-odds", "{yes_odds} of pool" }
                }
                div { class: "pool-box pool-no",
                    div { class: "pool-label", "NO" }
                    div { class: "pool-amount", "{no_amount}" }
                    div { class: "pool-odds", "{no_odds} of pool" }
                }
            }
            {position}
            {resolve}
            {betting}
        }
    }
}

#[component]
fn PositionPanel(market_id: u64, position: PositionView) -> Element {
    let controller = use_context::<PageController>();
    let claim = move |_| {
        let controller = controller.clone();
        spawn(async move {
            controller.claim_winnings(market_id).await;
        });
    };

    let claim_state = match position.claim {
        ClaimState::Open => None,
        ClaimState::Claimable => rsx! {
            button { class: "btn btn-success claim-btn", onclick: claim, "Claim Winnings" }
        },
        ClaimState::Claimed => rsx! {
            div { class: "claimed", "✓ Winnings Claimed" }
        },
    };

    let yes_stake = position.yes_label.clone();
    let no_stake = position.no_label.clone();

    rsx! {
        div { class: "user-position",
            h4 { "Your Position" }
            div { class: "position-grid",
                div { class: "info-item",
                    div { class: "info-label", "YES Stake" }
                    div { class: "info-value", "{yes_stake}" }
                }
                div { class: "info-item",
                    div { class: "info-label", "NO Stake" }
                    div { class: "info-value", "{no_stake}" }
                }
                for projection in position.projections.iter() {
                    div { class: "potential-winnings",
                        div { class: "potential-winnings-label", "{projection.label}" }
                        div { class: "potential-winnings-amount", "{projection.payout_label}" }
                    }
                }
            }
            {claim_state}
        }
    }
}

#[component]
fn ResolveControls(market_id: u64) -> Element {
    let resolver = use_context::<PageController>();
    let resolve = move |outcome: bool| {
        let controller = resolver.clone();
        spawn(async move {
            controller.resolve_market(market_id, outcome).await;
        });
    };
    let resolve_no = resolve.clone();
    let yes_label = resolve_label(true);
    let no_label = resolve_label(false);

    rsx! {
        div { class: "resolve-section",
            h4 { "⚠️ Resolve Market (Owner Only)" }
            div { class: "btn-group",
                button { class: "btn btn-success btn-small", onclick: move |_| resolve(true), "{yes_label}" }
                button { class: "btn btn-danger btn-small", onclick: move |_| resolve_no(false), "{no_label}" }
            }
        }
    }
}

#[component]
fn BetControls(market_id: u64) -> Element {
    let controller = use_context::<PageController>();
    let mut amount = use_signal(|| DEFAULT_BET.to_string());
    let amount_text = amount.read().clone();

    let bet = move |predict_yes: bool| {
        let controller = controller.clone();
        let stake = amount.read().clone();
        spawn(async move {
            controller.place_bet(market_id, predict_yes, &stake).await;
        });
    };
    let bet_no = bet.clone();

    rsx! {
        div { class: "bet-section",
            input {
                class: "bet-input",
                r#type: "number",
                placeholder: "Amount",
                step: "0.01",
                min: "0.01",
                value: "{amount_text}",
                oninput: move |evt| amount.set(evt.value()),
            }
            button { class: "btn btn-success", onclick: move |_| bet(true), "Bet YES" }
            button { class: "btn btn-danger", onclick: move |_| bet_no(false), "Bet NO" }
        }
    }
}
