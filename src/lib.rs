//! Malachite - Telegram storefront bot for an electronics shop
//!
//! This library provides all the functionality of the Malachite bot:
//! catalog navigation, basket and checkout, admin price management and
//! scheduled broadcasts.
//!
//! # Module Structure
//!
//! - `core`: Core utilities, configuration, errors, validation and money
//! - `catalog`: Category policy table and attribute resolver
//! - `session`: Per-user navigation and checkout state
//! - `checkout`: The linear order form state machine
//! - `storage`: SQLite persistence (catalog, basket, orders)
//! - `telegram`: Telegram bot integration and handlers

pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod core;
pub mod session;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{schema, HandlerDeps};
