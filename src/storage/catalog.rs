//! Read side of the catalog
//!
//! Reference data is seeded out-of-band; the bot only queries it. A missing
//! row is a domain answer (`Ok(None)`), not an error; sparse catalogs are
//! normal and handlers turn the miss into a polite message.

use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::catalog::{CategoryKind, Dimension, ItemKey};
use crate::core::money::parse_price;
use crate::core::AppResult;

pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
}

pub struct Model {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

/// One selectable value of an attribute dimension.
pub struct DimensionValue {
    pub id: i64,
    pub label: String,
}

pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Flattened item row for the admin price sheet.
pub struct PriceRow {
    pub id: i64,
    pub category: String,
    pub model: String,
    pub color: String,
    pub memory: Option<String>,
    pub screen_size: Option<String>,
    pub connectivity: Option<String>,
    pub ram: Option<String>,
    pub price: Decimal,
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, Option<String>)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn finish_item(raw: (i64, String, String, String, Option<String>)) -> AppResult<Item> {
    let (id, name, description, price, image_url) = raw;
    Ok(Item {
        id,
        name,
        description,
        price: parse_price(&price)?,
        image_url,
    })
}

/// Categories with an unknown `kind` are skipped with a warning so a bad
/// seed row cannot take the whole menu down.
pub fn list_categories(conn: &Connection) -> AppResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, kind FROM categories ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut categories = Vec::new();
    for row in rows {
        let (id, name, kind) = row?;
        match CategoryKind::parse(&kind) {
            Some(kind) => categories.push(Category { id, name, kind }),
            None => log::warn!("Category {} ({}) has unknown kind '{}'", id, name, kind),
        }
    }
    Ok(categories)
}

pub fn get_category(conn: &Connection, id: i64) -> AppResult<Option<Category>> {
    let raw = conn
        .query_row(
            "SELECT id, name, kind FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(raw.and_then(|(id, name, kind)| {
        CategoryKind::parse(&kind).map(|kind| Category { id, name, kind })
    }))
}

pub fn list_models(conn: &Connection, category_id: i64) -> AppResult<Vec<Model>> {
    let mut stmt =
        conn.prepare("SELECT id, name, category_id FROM models WHERE category_id = ?1 ORDER BY id")?;
    let models = stmt
        .query_map(params![category_id], |row| {
            Ok(Model {
                id: row.get(0)?,
                name: row.get(1)?,
                category_id: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(models)
}

pub fn get_model(conn: &Connection, id: i64) -> AppResult<Option<Model>> {
    let model = conn
        .query_row(
            "SELECT id, name, category_id FROM models WHERE id = ?1",
            params![id],
            |row| {
                Ok(Model {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category_id: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(model)
}

/// Selectable values of one dimension for one model, in seed order.
pub fn list_dimension_values(
    conn: &Connection,
    dim: Dimension,
    model_id: i64,
) -> AppResult<Vec<DimensionValue>> {
    let sql = match dim {
        Dimension::Color => "SELECT id, name FROM colors WHERE model_id = ?1 ORDER BY id",
        Dimension::Memory => "SELECT id, size FROM memories WHERE model_id = ?1 ORDER BY id",
        Dimension::ScreenSize => "SELECT id, size FROM screen_sizes WHERE model_id = ?1 ORDER BY id",
        Dimension::Connectivity => {
            "SELECT id, type FROM connectivities WHERE model_id = ?1 ORDER BY id"
        }
        Dimension::Ram => "SELECT id, size FROM rams WHERE model_id = ?1 ORDER BY id",
    };
    let mut stmt = conn.prepare(sql)?;
    let values = stmt
        .query_map(params![model_id], |row| {
            Ok(DimensionValue {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

/// Looks up the single item a complete selection denotes.
///
/// `IS` comparisons make NULL parameters match NULL columns, so the same
/// query serves every category kind regardless of which dimensions apply.
pub fn find_item(conn: &Connection, key: &ItemKey) -> AppResult<Option<Item>> {
    let raw = conn
        .query_row(
            "SELECT id, name, description, price, image_url FROM items
             WHERE model_id = ?1 AND color_id = ?2
               AND memory_id IS ?3 AND screen_size_id IS ?4
               AND connectivity_id IS ?5 AND ram_id IS ?6
             LIMIT 1",
            params![
                key.model_id,
                key.color_id,
                key.memory_id,
                key.screen_size_id,
                key.connectivity_id,
                key.ram_id
            ],
            item_from_row,
        )
        .optional()?;
    raw.map(finish_item).transpose()
}

pub fn get_item(conn: &Connection, id: i64) -> AppResult<Option<Item>> {
    let raw = conn
        .query_row(
            "SELECT id, name, description, price, image_url FROM items WHERE id = ?1",
            params![id],
            item_from_row,
        )
        .optional()?;
    raw.map(finish_item).transpose()
}

/// The full price sheet, one row per item with attribute labels resolved.
pub fn list_price_rows(conn: &Connection) -> AppResult<Vec<PriceRow>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, cat.name, mo.name, co.name,
                me.size, ss.size, cn.type, ra.size, i.price
         FROM items i
         JOIN categories cat ON cat.id = i.category_id
         JOIN models mo ON mo.id = i.model_id
         JOIN colors co ON co.id = i.color_id
         LEFT JOIN memories me ON me.id = i.memory_id
         LEFT JOIN screen_sizes ss ON ss.id = i.screen_size_id
         LEFT JOIN connectivities cn ON cn.id = i.connectivity_id
         LEFT JOIN rams ra ON ra.id = i.ram_id
         ORDER BY i.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, String>(8)?,
        ))
    })?;

    let mut sheet = Vec::new();
    for row in rows {
        let (id, category, model, color, memory, screen_size, connectivity, ram, price) = row?;
        sheet.push(PriceRow {
            id,
            category,
            model,
            color,
            memory,
            screen_size,
            connectivity,
            ram,
            price: parse_price(&price)?,
        });
    }
    Ok(sheet)
}

/// Returns false when no such item exists, so imports can report skips.
pub fn update_item_price(conn: &Connection, item_id: i64, price: Decimal) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE items SET price = ?2 WHERE id = ?1",
        params![item_id, price.to_string()],
    )?;
    Ok(changed > 0)
}
