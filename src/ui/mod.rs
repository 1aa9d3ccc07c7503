//! Dioxus page.
//!
//! Components only read region signals and forward clicks to the shared
//! [`Controller`]; all state changes flow back through [`PageHost`].

mod host;
mod markets;
mod sidebar;
mod toast;

pub use host::{PageHost, Regions};

use dioxus::prelude::*;
use futures::StreamExt;
use std::rc::Rc;
use tracing::{error, info};

use crate::app::Controller;
use crate::chain::BrowserWallet;
use crate::clock;
use crate::config::{Config, Settings};

use host::use_regions;
use markets::MarketsPanel;
use sidebar::{CreateMarketForm, WalletPanel};
use toast::NoticeToast;

pub type PageController = Rc<Controller<BrowserWallet, PageHost>>;

#[derive(Routable, Clone, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

#[component]
pub fn App() -> Element {
    rsx! {
        Router::<Route> {}
    }
}

#[component]
fn Home() -> Element {
    let settings = use_hook(|| {
        Config::embedded()
            .and_then(|config| config.settings())
            .map_err(|e| e.to_string())
    });

    match settings {
        Ok(settings) => rsx! {
            Dashboard { settings }
        },
        Err(message) => {
            error!(error = %message, "invalid configuration");
            rsx! {
                div { class: "container",
                    div { class: "card config-error",
                        h2 { "Configuration error" }
                        p { "{message}" }
                    }
                }
            }
        }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "container",
            div { class: "card empty-state",
                div { class: "empty-state-icon", "🧭" }
                p { "Nothing at /{path}" }
                Link { to: Route::Home {}, "Back to markets" }
            }
        }
    }
}

#[component]
fn Dashboard(settings: Settings) -> Element {
    let regions = use_regions(&settings.symbol);
    use_context_provider(|| regions);
    let controller: PageController = use_context_provider(|| {
        let wallet = BrowserWallet::new(&settings);
        Rc::new(Controller::new(settings.clone(), wallet, PageHost::new(regions)))
    });

    let startup = controller.clone();
    use_future(move || {
        let controller = startup.clone();
        async move {
            info!(
                network = %controller.settings().network_name,
                contract = ?controller.settings().contract_address,
                "flare-predict starting"
            );
            let Some(mut events) = controller.initialize().await else {
                return;
            };
            while let Some(event) = events.next().await {
                controller.on_wallet_event(event);
            }
        }
    });

    let ticker = controller.clone();
    use_future(move || {
        let controller = ticker.clone();
        async move {
            if !controller.settings().auto_refresh {
                return;
            }
            let interval = controller.settings().refresh_interval;
            loop {
                clock::sleep(interval).await;
                controller.refresh().await;
            }
        }
    });

    rsx! {
        div { class: "container",
            div { class: "sidebar",
                WalletPanel {}
                CreateMarketForm {}
            }
            div { class: "main",
                div { class: "card",
                    h2 { "Markets" }
                    MarketsPanel {}
                }
            }
        }
        NoticeToast {}
    }
}
