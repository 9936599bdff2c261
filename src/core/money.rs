//! Decimal price arithmetic
//!
//! Prices live in the database as decimal text (`"33.33"`). All arithmetic
//! goes through `rust_decimal` so per-line and basket totals never pick up
//! binary floating point drift.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a textual price from the items table.
pub fn parse_price(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(raw.trim())
}

/// Total for one basket line: price * quantity.
pub fn line_total(price: Decimal, quantity: i64) -> Decimal {
    price * Decimal::from(quantity)
}

/// Formats a price for user-facing messages.
pub fn format_price(value: Decimal) -> String {
    value.normalize().to_string()
}
