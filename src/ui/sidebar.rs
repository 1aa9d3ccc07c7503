use dioxus::prelude::*;

use super::{PageController, Regions};
use crate::view::AdminView;

#[component]
pub fn WalletPanel() -> Element {
    let regions = use_context::<Regions>();
    let controller = use_context::<PageController>();
    let view = regions.wallet.read().clone();
    let admin = regions.admin.read().clone();
    let network = controller.settings().network_name.clone();

    let connect = move |_| {
        let controller = controller.clone();
        spawn(async move {
            controller.connect_wallet().await;
        });
    };

    let address = view.address_label.clone();
    let balance = view.balance_label.clone();
    let status = view.status.label();
    let button_label = view.button_label();
    let button_class = view.button_class();
    let admin_panel = match admin {
        Some(view) => rsx! { AdminPanel { view } },
        None => None,
    };

    rsx! {
        div { class: "card header-card",
            div { class: "logo", "F" }
            div { class: "header-info",
                h1 { "FLARE PREDICT" }
                div { class: "header-subtitle", "Prediction Markets • {network} Network" }
            }
        }
        div { class: "card wallet-card",
            h3 { "Wallet" }
            if view.owner_badge {
                div { class: "owner-badge", "Contract Owner" }
            }
            div { class: "wallet-address", "{address}" }
            div { class: "wallet-balance", "{balance}" }
            button { class: "{button_class}", onclick: connect, "{button_label}" }
            div { class: "divider" }
            div { class: "info-grid",
                div { class: "info-item",
                    div { class: "info-label", "Network" }
                    div { class: "info-value", "{network}" }
                }
                div { class: "info-item",
                    div { class: "info-label", "Status" }
                    div { class: "info-value", "{status}" }
                }
            }
            {admin_panel}
        }
    }
}

#[component]
fn AdminPanel(view: AdminView) -> Element {
    let controller = use_context::<PageController>();
    let withdraw = move |_| {
        let controller = controller.clone();
        spawn(async move {
            controller.withdraw_fees().await;
        });
    };
    let fees = view.fees_label;

    rsx! {
        div { class: "admin-section",
            div { class: "divider" }
            h3 { "Admin Controls" }
            div { class: "info-item admin-fees",
                div { class: "info-label", "Collected Fees" }
                div { class: "info-value", "{fees}" }
            }
            button { class: "btn btn-warning", onclick: withdraw, "Withdraw Fees" }
        }
    }
}

#[component]
pub fn CreateMarketForm() -> Element {
    let regions = use_context::<Regions>();
    let controller = use_context::<PageController>();
    let mut question = regions.question;
    let mut duration = regions.duration;

    let question_text = question.read().clone();
    let duration_text = duration.read().clone();

    let create = move |_| {
        let controller = controller.clone();
        let text = question.read().clone();
        let minutes = duration.read().clone();
        spawn(async move {
            controller.create_market(&text, &minutes).await;
        });
    };

    rsx! {
        div { class: "card create-section",
            h2 { "Create Market" }
            div { class: "form-group",
                label { "Question" }
                textarea {
                    placeholder: "Will Bitcoin reach $100k by end of 2025?",
                    value: "{question_text}",
                    oninput: move |evt| question.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Duration (minutes)" }
                input {
                    r#type: "number",
                    min: "1",
                    max: "1440",
                    value: "{duration_text}",
                    oninput: move |evt| duration.set(evt.value()),
                }
            }
            button { class: "btn btn-primary", onclick: create, "Create Market" }
        }
    }
}
