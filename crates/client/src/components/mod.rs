//! Reusable UI components.

pub mod ui;
pub mod wallet;
