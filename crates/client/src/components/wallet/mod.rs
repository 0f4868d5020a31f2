//! Wallet connection widgets.

pub mod badge;
pub mod network_switcher;
pub mod notices;

pub use badge::*;
pub use network_switcher::*;
pub use notices::*;
