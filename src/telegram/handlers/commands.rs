//! Slash command handlers

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::types::HandlerDeps;
use crate::core::{config, AppResult};
use crate::storage::db::ensure_user;
use crate::storage::get_connection;
use crate::telegram::admin::handle_export_prices;
use crate::telegram::bot::Command;
use crate::telegram::keyboards;

const GREETING: &str = "Добро пожаловать в магазин техники Malachite! 🛍\n\nВыберите раздел:";

pub async fn handle_command(bot: Bot, msg: Message, deps: HandlerDeps, cmd: Command) -> AppResult<()> {
    let chat_id = msg.chat.id;
    let telegram_id = chat_id.0;
    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());

    match cmd {
        Command::Start => {
            {
                let conn = get_connection(&deps.db_pool)?;
                ensure_user(&conn, telegram_id, username)?;
            }
            deps.sessions.clear(telegram_id);
            bot.send_message(chat_id, GREETING)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Command::Menu => {
            bot.send_message(chat_id, "Выберите раздел:")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string()).await?;
        }
        Command::ExportPrices => {
            if !config::admin::is_admin(telegram_id) {
                log::warn!("Unauthorized /exportprices from {}", telegram_id);
                bot.send_message(chat_id, "Эта команда доступна только администраторам.")
                    .await?;
                return Ok(());
            }
            handle_export_prices(&bot, &deps.db_pool, chat_id).await?;
        }
    }
    Ok(())
}
