pub mod api;
pub mod auth;
pub mod ledger;

pub use api::*;
pub use auth::*;
pub use ledger::*;
