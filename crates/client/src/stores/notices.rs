//! Toast notices raised by wallet actions.

use dioxus::prelude::*;
use blockvote_shared::Notice;

/// Most notices kept on screen at once; older ones are dropped first.
const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredNotice {
    pub id: u64,
    pub notice: Notice,
}

/// Notices currently shown, oldest first
pub static NOTICES: GlobalSignal<Vec<StoredNotice>> = Signal::global(Vec::new);

static NEXT_NOTICE_ID: GlobalSignal<u64> = Signal::global(|| 0);

/// Show a notice
pub fn push_notice(notice: Notice) {
    let id = {
        let mut next = NEXT_NOTICE_ID.write();
        *next += 1;
        *next
    };

    let mut notices = NOTICES.write();
    notices.push(StoredNotice { id, notice });
    let overflow = notices.len().saturating_sub(MAX_NOTICES);
    notices.drain(..overflow);
}

/// Remove a notice once the user closes it
pub fn dismiss_notice(id: u64) {
    NOTICES.write().retain(|n| n.id != id);
}
