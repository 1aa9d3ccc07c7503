use dioxus::prelude::*;
use std::time::Duration;
use tracing::warn;

use crate::app::Host;
use crate::clock;
use crate::notify::{Notice, NoticeBoard};
use crate::view::{AdminView, MarketsView, WalletView};

/// Duration prefilled in the create-market form, in minutes.
pub const DEFAULT_DURATION: &str = "5";

/// One signal per page region plus the create-market form inputs.
#[derive(Clone, Copy)]
pub struct Regions {
    pub wallet: Signal<WalletView>,
    pub admin: Signal<Option<AdminView>>,
    pub markets: Signal<MarketsView>,
    pub notices: Signal<NoticeBoard>,
    pub question: Signal<String>,
    pub duration: Signal<String>,
}

pub fn use_regions(symbol: &str) -> Regions {
    let disconnected = WalletView::disconnected(symbol);
    Regions {
        wallet: use_signal(move || disconnected),
        admin: use_signal(|| None),
        markets: use_signal(|| MarketsView::Disconnected),
        notices: use_signal(NoticeBoard::default),
        question: use_signal(String::new),
        duration: use_signal(|| DEFAULT_DURATION.to_string()),
    }
}

/// [`Host`] backed by the Dioxus page and the browser window.
#[derive(Clone, Copy)]
pub struct PageHost {
    regions: Regions,
}

impl PageHost {
    pub fn new(regions: Regions) -> Self {
        Self { regions }
    }
}

impl Host for PageHost {
    fn show_wallet(&self, view: WalletView) {
        let mut wallet = self.regions.wallet;
        wallet.set(view);
    }

    fn show_admin(&self, view: Option<AdminView>) {
        let mut admin = self.regions.admin;
        admin.set(view);
    }

    fn show_markets(&self, view: MarketsView) {
        let mut markets = self.regions.markets;
        markets.set(view);
    }

    fn notify(&self, notice: Notice) {
        let mut notices = self.regions.notices;
        notices.write().show(notice);
    }

    fn reset_create_form(&self) {
        let mut question = self.regions.question;
        let mut duration = self.regions.duration;
        question.set(String::new());
        duration.set(DEFAULT_DURATION.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }

    fn reload(&self) {
        let reloaded = web_sys::window().map(|window| window.location().reload());
        if !matches!(reloaded, Some(Ok(()))) {
            warn!("page reload failed");
        }
    }

    fn now(&self) -> u64 {
        clock::unix_now()
    }

    async fn sleep(&self, duration: Duration) {
        clock::sleep(duration).await;
    }
}
