use dioxus::prelude::*;

use super::Regions;
use crate::clock;
use crate::notify::NOTICE_TTL;

/// The single visible notice. Each new notice arms its own dismiss timer;
/// a timer for a replaced notice expires nothing.
#[component]
pub fn NoticeToast() -> Element {
    let regions = use_context::<Regions>();
    let notices = regions.notices;

    use_effect(move || {
        let Some(id) = notices.read().current_id() else {
            return;
        };
        spawn(async move {
            clock::sleep(NOTICE_TTL).await;
            let mut notices = notices;
            notices.write().expire(id);
        });
    });

    let notice = notices.read().current().cloned()?;
    let class = notice.level.css_class();
    rsx! {
        div { class: "notification {class}", "{notice.message}" }
    }
}
