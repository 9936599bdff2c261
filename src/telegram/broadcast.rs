//! Scheduled broadcast fan-out
//!
//! Sends a promo message to every registered user with bounded concurrency.
//! A blocked or deleted chat only costs that one recipient; the sweep
//! continues and the totals are logged at the end.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, StreamExt};
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::time::interval;

use crate::core::{config, AppResult};
use crate::storage::{db, get_connection, DbPool};

/// Outcome totals of one broadcast sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends `message` (with an optional photo) to every user.
pub async fn broadcast_to_all(
    bot: &Bot,
    db_pool: &DbPool,
    message: &str,
    image_path: Option<&str>,
) -> AppResult<BroadcastReport> {
    let user_ids = {
        let conn = get_connection(db_pool)?;
        db::list_user_ids(&conn)?
    };
    log::info!("Broadcasting to {} users", user_ids.len());

    let image = image_path.filter(|p| Path::new(p).exists());

    let results = stream::iter(user_ids)
        .map(|user_id| {
            let bot = bot.clone();
            let image = image.map(str::to_owned);
            async move {
                let sent = match image {
                    Some(path) => bot
                        .send_photo(ChatId(user_id), InputFile::file(path))
                        .caption(message.to_string())
                        .await
                        .map(|_| ()),
                    None => bot
                        .send_message(ChatId(user_id), message.to_string())
                        .await
                        .map(|_| ()),
                };
                match sent {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("Broadcast to {} failed: {}", user_id, e);
                        false
                    }
                }
            }
        })
        .buffer_unordered(config::broadcast::MAX_CONCURRENT_SENDS)
        .collect::<Vec<bool>>()
        .await;

    let report = BroadcastReport {
        sent: results.iter().filter(|ok| **ok).count(),
        failed: results.iter().filter(|ok| !**ok).count(),
    };
    log::info!("Broadcast done: {} sent, {} failed", report.sent, report.failed);
    Ok(report)
}

/// Spawns the periodic promo broadcast if BROADCAST_INTERVAL_HOURS is set.
pub fn start_broadcast_task(bot: Bot, db_pool: Arc<DbPool>) {
    let interval_hours = *config::broadcast::INTERVAL_HOURS;
    if interval_hours == 0 {
        log::info!("Scheduled broadcast disabled (BROADCAST_INTERVAL_HOURS=0)");
        return;
    }

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_hours * 60 * 60));
        // First tick fires immediately; skip it so startup stays quiet
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(message) = config::broadcast::MESSAGE.as_deref() else {
                log::warn!("BROADCAST_MESSAGE is not set, skipping scheduled broadcast");
                continue;
            };
            let image = config::broadcast::IMAGE_PATH.as_deref();
            if let Err(e) = broadcast_to_all(&bot, &db_pool, message, image).await {
                log::error!("Scheduled broadcast failed: {}", e);
            }
        }
    });
    log::info!("Scheduled broadcast started (every {} hours)", interval_hours);
}
