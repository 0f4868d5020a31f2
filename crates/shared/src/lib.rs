//! Shared types for the BlockVote wallet core and its consumers.

pub mod error;
pub mod models;
pub mod networks;
pub mod protocol;

pub use error::*;
pub use models::*;
pub use networks::NetworkDescriptor;
pub use protocol::*;
