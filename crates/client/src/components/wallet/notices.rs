use dioxus::prelude::*;
use blockvote_shared::NoticeLevel;

use crate::stores::{dismiss_notice, StoredNotice, NOTICES};

fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "rounded-lg bg-gray-800 p-3 text-white shadow",
        NoticeLevel::Destructive => "rounded-lg bg-red-700 p-3 text-white shadow",
    }
}

/// Stack of toast notices in the corner of the screen.
#[component]
pub fn NoticeList() -> Element {
    rsx! {
        div { class: "fixed bottom-4 right-4 flex w-80 flex-col gap-2",
            for StoredNotice { id, notice } in NOTICES.read().iter().cloned() {
                div {
                    key: "{id}",
                    class: notice_class(notice.level),
                    div { class: "flex items-start justify-between gap-2",
                        p { class: "font-semibold", "{notice.title}" }
                        button {
                            class: "text-xs text-gray-300 hover:text-white",
                            onclick: move |_| dismiss_notice(id),
                            "✕"
                        }
                    }
                    p { class: "text-sm text-gray-200", "{notice.description}" }
                }
            }
        }
    }
}
