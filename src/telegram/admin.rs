//! Admin price sheet export and import
//!
//! Export flattens the catalog into one CSV row per item; import reads the
//! same sheet back and applies edited prices by item id. The sheet uses a
//! ';' delimiter and a UTF-8 BOM so spreadsheet tools open it with cyrillic
//! headers intact.

use std::io::{Read, Write};
use std::path::Path;

use rust_decimal::Decimal;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::core::money::parse_price;
use crate::core::{config, AppError, AppResult};
use crate::storage::catalog::{list_price_rows, update_item_price, PriceRow};
use crate::storage::{get_connection, DbPool};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const SHEET_HEADERS: [&str; 9] = [
    "ID",
    "Категория",
    "Модель",
    "Цвет",
    "Память",
    "Экран",
    "Подключение",
    "RAM",
    "Цена",
];

/// Serializes the price sheet. BOM first, then header and item rows.
pub fn write_price_sheet<W: Write>(rows: &[PriceRow], mut out: W) -> AppResult<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(SHEET_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.category.clone(),
            row.model.clone(),
            row.color.clone(),
            row.memory.clone().unwrap_or_default(),
            row.screen_size.clone().unwrap_or_default(),
            row.connectivity.clone().unwrap_or_default(),
            row.ram.clone().unwrap_or_default(),
            row.price.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Parses an edited sheet back into (item id, new price) pairs.
///
/// Only the first and last columns matter; everything between is display
/// context the admin is free to mangle. Rows whose id or price do not
/// parse are counted and skipped so one stray line cannot sink the rest
/// of the import; only reader-level CSV failures abort.
pub fn parse_price_sheet<R: Read>(input: R) -> AppResult<(Vec<(i64, Decimal)>, usize)> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_reader(input);
    let mut updates = Vec::new();
    let mut malformed = 0;
    for record in reader.records() {
        let record = record?;
        let id_field = record.get(0).unwrap_or_default().trim();
        let price_field = record.get(SHEET_HEADERS.len() - 1).unwrap_or_default().trim();

        match (id_field.parse::<i64>(), parse_price(price_field)) {
            (Ok(item_id), Ok(price)) => updates.push((item_id, price)),
            _ => {
                log::warn!(
                    "Skipping malformed price sheet row (id '{}', price '{}')",
                    id_field,
                    price_field
                );
                malformed += 1;
            }
        }
    }
    Ok((updates, malformed))
}

/// Price sheets arrive as `.csv` documents; anything else an admin sends
/// is not an import attempt.
pub fn is_price_sheet_name(file_name: Option<&str>) -> bool {
    file_name.is_some_and(|name| name.ends_with(".csv"))
}

/// Applies updates in one transaction. Returns (updated, skipped) counts;
/// skipped rows reference item ids that no longer exist.
pub fn apply_price_updates(
    conn: &mut rusqlite::Connection,
    updates: &[(i64, Decimal)],
) -> AppResult<(usize, usize)> {
    let tx = conn.transaction()?;
    let mut updated = 0;
    let mut skipped = 0;
    for &(item_id, price) in updates {
        if update_item_price(&tx, item_id, price)? {
            updated += 1;
        } else {
            skipped += 1;
        }
    }
    tx.commit()?;
    Ok((updated, skipped))
}

/// Exports the sheet to the configured path and sends it to the chat.
pub async fn handle_export_prices(bot: &Bot, db_pool: &DbPool, chat_id: ChatId) -> AppResult<()> {
    let rows = {
        let conn = get_connection(db_pool)?;
        list_price_rows(&conn)?
    };

    let path = Path::new(config::admin::PRICES_EXPORT_PATH.as_str());
    let file = std::fs::File::create(path)?;
    write_price_sheet(&rows, file)?;
    log::info!("Exported {} price rows to {}", rows.len(), path.display());

    bot.send_document(chat_id, InputFile::file(path)).await?;
    Ok(())
}

/// Downloads an uploaded sheet and applies its prices.
pub async fn handle_price_sheet_document(
    bot: &Bot,
    db_pool: &DbPool,
    chat_id: ChatId,
    file_id: teloxide::types::FileId,
) -> AppResult<()> {
    let file = bot.get_file(file_id).await?;

    let tmp_path = std::env::temp_dir().join(format!("prices_import_{}.csv", chat_id.0));
    {
        let mut dst = tokio::fs::File::create(&tmp_path).await?;
        bot.download_file(&file.path, &mut dst).await?;
    }

    let result = async {
        let data = tokio::fs::read(&tmp_path).await?;
        let (updates, malformed) = parse_price_sheet(data.as_slice())?;

        let mut conn = get_connection(db_pool)?;
        let (updated, skipped) = apply_price_updates(&mut conn, &updates)?;
        log::info!(
            "Price import for chat {}: {} updated, {} unknown, {} malformed",
            chat_id.0,
            updated,
            skipped,
            malformed
        );

        let mut report = format!("✅ Обновлено цен: {}", updated);
        if skipped > 0 {
            report.push_str(&format!("\n⚠️ Пропущено строк с неизвестным ID: {}", skipped));
        }
        if malformed > 0 {
            report.push_str(&format!("\n⚠️ Пропущено нечитаемых строк: {}", malformed));
        }
        bot.send_message(chat_id, report).await?;
        Ok::<(), AppError>(())
    }
    .await;

    let _ = tokio::fs::remove_file(&tmp_path).await;
    result
}
