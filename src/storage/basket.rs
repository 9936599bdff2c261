//! Basket and order ledger
//!
//! One basket row per (user, item); re-adding an item bumps its quantity.
//! Checkout turns the basket into an order row and clears it inside a
//! single transaction, so a crash mid-way leaves either both effects or
//! neither. Handlers serialize basket mutations per user with `UserLocks`.

use rusqlite::{params, Connection, TransactionBehavior};
use rust_decimal::Decimal;

use crate::checkout::OrderForm;
use crate::core::money::{line_total, parse_price};
use crate::core::AppResult;
use crate::storage::db::update_user_contacts;

/// One basket position with its item fields and attribute labels resolved.
pub struct BasketLine {
    pub item_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    pub color: String,
    pub memory: Option<String>,
    pub screen_size: Option<String>,
    pub connectivity: Option<String>,
    pub ram: Option<String>,
}

impl BasketLine {
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }

    /// Comma-joined attribute labels, absent dimensions omitted.
    pub fn attributes(&self) -> String {
        let mut parts = vec![self.color.as_str()];
        for label in [&self.memory, &self.screen_size, &self.connectivity, &self.ram] {
            if let Some(label) = label.as_deref() {
                parts.push(label);
            }
        }
        parts.join(", ")
    }
}

/// A completed checkout, for the confirmation message and admin notice.
pub struct Receipt {
    pub order_id: i64,
    pub lines: Vec<BasketLine>,
    pub total: Decimal,
}

/// Adds one unit of the item to the user's basket.
///
/// Returns false when the item id does not exist (stale callback data).
pub fn add_item(conn: &Connection, user_id: i64, item_id: i64) -> AppResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE id = ?1",
        params![item_id],
        |row| Ok(row.get::<_, i64>(0)? > 0),
    )?;
    if !exists {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO basket (user_id, item_id, quantity) VALUES (?1, ?2, 1)
         ON CONFLICT(user_id, item_id) DO UPDATE SET quantity = quantity + 1",
        params![user_id, item_id],
    )?;
    Ok(true)
}

/// Basket positions with their attribute labels resolved, outer-joined on
/// the dimensions the item's category does not use.
pub fn list_basket(conn: &Connection, user_id: i64) -> AppResult<Vec<BasketLine>> {
    let mut stmt = conn.prepare(
        "SELECT b.item_id, i.name, i.price, b.quantity,
                co.name, me.size, ss.size, cn.type, ra.size
         FROM basket b
         JOIN items i ON i.id = b.item_id
         JOIN colors co ON co.id = i.color_id
         LEFT JOIN memories me ON me.id = i.memory_id
         LEFT JOIN screen_sizes ss ON ss.id = i.screen_size_id
         LEFT JOIN connectivities cn ON cn.id = i.connectivity_id
         LEFT JOIN rams ra ON ra.id = i.ram_id
         WHERE b.user_id = ?1
         ORDER BY b.id",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
        ))
    })?;

    let mut lines = Vec::new();
    for row in rows {
        let (item_id, name, price, quantity, color, memory, screen_size, connectivity, ram) = row?;
        lines.push(BasketLine {
            item_id,
            name,
            price: parse_price(&price)?,
            quantity,
            color,
            memory,
            screen_size,
            connectivity,
            ram,
        });
    }
    Ok(lines)
}

pub fn basket_total(lines: &[BasketLine]) -> Decimal {
    lines.iter().map(BasketLine::total).sum()
}

/// Removes a position entirely. Returns false if it was not there.
pub fn remove_item(conn: &Connection, user_id: i64, item_id: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "DELETE FROM basket WHERE user_id = ?1 AND item_id = ?2",
        params![user_id, item_id],
    )?;
    Ok(changed > 0)
}

pub fn clear_basket(conn: &Connection, user_id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM basket WHERE user_id = ?1", params![user_id])?;
    Ok(())
}

/// Turns the basket into an order.
///
/// Order insert, basket clear and contact memo happen in one immediate
/// transaction. Returns `None` when the basket is empty; an order with no
/// positions must never be created.
pub fn checkout(conn: &mut Connection, user_id: i64, form: &OrderForm) -> AppResult<Option<Receipt>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let lines = list_basket(&tx, user_id)?;
    if lines.is_empty() {
        return Ok(None);
    }

    tx.execute(
        "INSERT INTO orders (user_id, name, address, phone, email, delivery_datetime)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            form.name,
            form.address,
            form.phone,
            form.email,
            form.delivery_datetime
        ],
    )?;
    let order_id = tx.last_insert_rowid();

    tx.execute("DELETE FROM basket WHERE user_id = ?1", params![user_id])?;
    update_user_contacts(&tx, user_id, &form.phone, &form.email)?;

    tx.commit()?;

    let total = basket_total(&lines);
    Ok(Some(Receipt {
        order_id,
        lines,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::ensure_user;
    use crate::storage::migrations::run_migrations_for_test;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations_for_test(&mut conn).unwrap();
        seed_minimal_catalog(&conn);
        conn
    }

    fn seed_minimal_catalog(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO categories (id, name, kind) VALUES (1, 'iPhone', 'phone');
             INSERT INTO models (id, name, category_id) VALUES (1, 'iPhone 15', 1);
             INSERT INTO colors (id, name, model_id) VALUES (1, 'Черный', 1);
             INSERT INTO memories (id, size, model_id) VALUES (1, '128 GB', 1);
             INSERT INTO items (id, name, description, price, category_id, model_id, color_id, memory_id)
             VALUES (1, 'iPhone 15 Черный 128 GB', '', '99990', 1, 1, 1, 1);
             INSERT INTO items (id, name, description, price, category_id, model_id, color_id, memory_id)
             VALUES (2, 'iPhone 15 Черный 256 GB', '', '33.33', 1, 1, 1, NULL);",
        )
        .unwrap();
    }

    fn test_form() -> OrderForm {
        OrderForm {
            name: "Иванов".into(),
            address: "Москва".into(),
            phone: "+79991234567".into(),
            email: "a@b.ru".into(),
            delivery_datetime: "завтра".into(),
        }
    }

    #[test]
    fn re_adding_an_item_bumps_quantity() {
        let conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();

        assert!(add_item(&conn, 10, 1).unwrap());
        assert!(add_item(&conn, 10, 1).unwrap());

        let lines = list_basket(&conn, 10).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn adding_a_missing_item_is_reported() {
        let conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();
        assert!(!add_item(&conn, 10, 999).unwrap());
        assert!(list_basket(&conn, 10).unwrap().is_empty());
    }

    #[test]
    fn lines_carry_resolved_attribute_labels() {
        let conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();
        add_item(&conn, 10, 1).unwrap();
        add_item(&conn, 10, 2).unwrap();

        let lines = list_basket(&conn, 10).unwrap();
        assert_eq!(lines[0].color, "Черный");
        assert_eq!(lines[0].memory.as_deref(), Some("128 GB"));
        assert_eq!(lines[0].attributes(), "Черный, 128 GB");
        // The second item has no memory row; the outer join leaves it out
        assert!(lines[1].memory.is_none());
        assert_eq!(lines[1].attributes(), "Черный");
    }

    #[test]
    fn totals_use_exact_decimal_arithmetic() {
        let conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();
        for _ in 0..3 {
            add_item(&conn, 10, 2).unwrap();
        }

        let lines = list_basket(&conn, 10).unwrap();
        assert_eq!(basket_total(&lines).to_string(), "99.99");
    }

    #[test]
    fn checkout_creates_order_and_clears_basket_atomically() {
        let mut conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();
        add_item(&conn, 10, 1).unwrap();

        let receipt = checkout(&mut conn, 10, &test_form()).unwrap().unwrap();
        assert_eq!(receipt.lines.len(), 1);
        assert!(list_basket(&conn, 10).unwrap().is_empty());

        let status: String = conn
            .query_row(
                "SELECT status FROM orders WHERE id = ?1",
                params![receipt.order_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, "pending");

        let phone: Option<String> = conn
            .query_row("SELECT phone FROM users WHERE telegram_id = 10", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(phone.as_deref(), Some("+79991234567"));
    }

    #[test]
    fn checkout_with_empty_basket_is_rejected() {
        let mut conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();

        assert!(checkout(&mut conn, 10, &test_form()).unwrap().is_none());
        let orders: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[test]
    fn remove_item_reports_whether_it_existed() {
        let conn = test_conn();
        ensure_user(&conn, 10, None).unwrap();
        add_item(&conn, 10, 1).unwrap();

        assert!(remove_item(&conn, 10, 1).unwrap());
        assert!(list_basket(&conn, 10).unwrap().is_empty());
        assert!(!remove_item(&conn, 10, 1).unwrap());
    }
}
