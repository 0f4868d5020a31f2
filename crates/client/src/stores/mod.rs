//! Global stores for application state.

pub mod notices;

pub use notices::{dismiss_notice, push_notice, StoredNotice, NOTICES};
