//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::catalog_flow::handle_callback;
use super::checkout_flow::handle_text;
use super::commands::handle_command;
use super::types::{HandlerDeps, HandlerError};
use crate::core::config;
use crate::telegram::admin::{handle_price_sheet_document, is_price_sheet_name};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the bot.
///
/// The same tree is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_document = deps.clone();
    let deps_callback = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        // Price sheet upload from an admin
        .branch(document_handler(deps_document))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id;
                if let Err(e) = handle_command(bot.clone(), msg, deps, cmd).await {
                    log::error!("Command handler failed for chat {}: {}", chat_id, e);
                    let _ = bot
                        .send_message(chat_id, "Что-то пошло не так. Попробуйте еще раз.")
                        .await;
                }
                Ok(())
            }
        })
}

fn document_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            is_price_sheet_name(msg.document().and_then(|d| d.file_name.as_deref()))
                && msg
                    .from
                    .as_ref()
                    .map(|u| config::admin::is_admin(i64::try_from(u.id.0).unwrap_or_default()))
                    .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(document) = msg.document() else { return Ok(()) };
                let file_id = document.file.id.clone();
                if let Err(e) =
                    handle_price_sheet_document(&bot, &deps.db_pool, msg.chat.id, file_id).await
                {
                    log::error!("Price sheet import failed for chat {}: {}", msg.chat.id, e);
                    let _ = bot
                        .send_message(msg.chat.id, format!("❌ Импорт не удался: {}", e))
                        .await;
                }
                Ok(())
            }
        })
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some() || msg.contact().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id;
                if let Err(e) = handle_text(bot.clone(), msg, deps).await {
                    log::error!("Message handler failed for chat {}: {}", chat_id, e);
                    let _ = bot
                        .send_message(chat_id, "Что-то пошло не так. Попробуйте еще раз.")
                        .await;
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let user_id = q.from.id;
            if let Err(e) = handle_callback(bot, q, deps).await {
                log::error!("Callback handler failed for user {}: {}", user_id, e);
            }
            Ok(())
        }
    })
}
