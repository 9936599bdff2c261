//! SQLite persistence: pool, migrations, catalog, basket and orders

pub mod basket;
pub mod catalog;
pub mod db;
pub mod migrations;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
