//! Update handlers: commands, catalog callbacks, checkout messages

pub mod catalog_flow;
pub mod checkout_flow;
pub mod commands;
pub mod schema;
pub mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
