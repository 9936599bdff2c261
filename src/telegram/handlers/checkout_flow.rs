//! Plain-text message handling: checkout form and individual requests

use teloxide::prelude::*;

use super::types::HandlerDeps;
use crate::checkout::StepOutcome;
use crate::core::money::format_price;
use crate::core::AppResult;
use crate::storage::basket;
use crate::storage::get_connection;
use crate::telegram::keyboards;
use crate::telegram::notifications::{notify_admins_individual_request, notify_admins_new_order};

pub async fn handle_text(bot: Bot, msg: Message, deps: HandlerDeps) -> AppResult<()> {
    // A shared contact stands in for typed input on the phone step
    let contact_phone = msg.contact().map(|c| c.phone_number.clone());
    let Some(text) = contact_phone.as_deref().or_else(|| msg.text()) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let telegram_id = chat_id.0;

    let session = deps.sessions.get(telegram_id);

    if session.checkout.is_some() {
        return advance_checkout(&bot, &msg, &deps, text).await;
    }

    if session.pending_request {
        deps.sessions.update(telegram_id, |s| s.pending_request = false);
        let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
        notify_admins_individual_request(&bot, telegram_id, username, text).await;
        bot.send_message(chat_id, "✅ Запрос отправлен. Мы свяжемся с Вами в ближайшее время.")
            .await?;
        return Ok(());
    }

    // Free text outside any flow
    bot.send_message(chat_id, "Выберите раздел:")
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

async fn advance_checkout(bot: &Bot, msg: &Message, deps: &HandlerDeps, text: &str) -> AppResult<()> {
    let chat_id = msg.chat.id;
    let telegram_id = chat_id.0;

    let mut outcome = None;
    deps.sessions.update(telegram_id, |s| {
        if let Some(form) = s.checkout.as_mut() {
            let result = form.apply(text);
            if matches!(result, StepOutcome::Completed(_) | StepOutcome::Cancelled) {
                s.checkout = None;
            }
            outcome = Some(result);
        }
    });

    match outcome {
        Some(StepOutcome::Prompt(prompt)) => {
            // The phone step offers a contact-share button; every other
            // prompt past the name step drops the reply keyboard
            if prompt == crate::checkout::PHONE_PROMPT {
                bot.send_message(chat_id, prompt)
                    .reply_markup(keyboards::share_phone())
                    .await?;
            } else {
                bot.send_message(chat_id, prompt)
                    .reply_markup(keyboards::remove_reply_keyboard())
                    .await?;
            }
        }
        Some(StepOutcome::Invalid(reason)) => {
            bot.send_message(chat_id, reason).await?;
        }
        Some(StepOutcome::Cancelled) => {
            bot.send_message(chat_id, "Оформление заказа отменено.")
                .reply_markup(keyboards::remove_reply_keyboard())
                .await?;
            bot.send_message(chat_id, "Выберите раздел:")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Some(StepOutcome::Completed(form)) => {
            let receipt = {
                let _guard = deps.user_locks.acquire(telegram_id).await;
                let mut conn = get_connection(&deps.db_pool)?;
                basket::checkout(&mut conn, telegram_id, &form)?
            };

            match receipt {
                Some(receipt) => {
                    log::info!(
                        "Order {} placed by {} ({} positions, total {})",
                        receipt.order_id,
                        telegram_id,
                        receipt.lines.len(),
                        receipt.total
                    );
                    let mut confirmation = format!(
                        "🎉 Спасибо за заказ, {}!\n\nЗаказ №{}:\n",
                        form.name, receipt.order_id
                    );
                    for line in &receipt.lines {
                        confirmation.push_str(&format!(
                            "• {} ({}) — {} шт. × {} ₽\n",
                            line.name,
                            line.attributes(),
                            line.quantity,
                            format_price(line.price),
                        ));
                    }
                    confirmation.push_str(&format!(
                        "\nИтого: {} ₽\nДоставка: {}\n\nМы свяжемся с Вами для подтверждения.",
                        format_price(receipt.total),
                        form.delivery_datetime,
                    ));
                    bot.send_message(chat_id, confirmation).await?;

                    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
                    notify_admins_new_order(bot, telegram_id, username, &receipt, &form.name, &form.phone)
                        .await;
                }
                None => {
                    bot.send_message(chat_id, "Корзина пуста, заказ не оформлен.").await?;
                }
            }
        }
        None => {}
    }
    Ok(())
}
