//! Admin notifications
//!
//! Best-effort: a failed notice is logged and never bubbles back into the
//! user-facing flow.

use teloxide::prelude::*;

use crate::core::config;
use crate::core::money::format_price;
use crate::storage::basket::Receipt;

pub async fn notify_admins_text(bot: &Bot, text: &str) {
    for &admin_id in config::admin::ADMIN_IDS.iter() {
        if let Err(e) = bot.send_message(ChatId(admin_id), text).await {
            log::warn!("Failed to notify admin {}: {}", admin_id, e);
        }
    }
}

/// Tells every admin about a freshly placed order.
pub async fn notify_admins_new_order(
    bot: &Bot,
    user_id: i64,
    username: Option<&str>,
    receipt: &Receipt,
    name: &str,
    phone: &str,
) {
    let mut text = format!(
        "📦 Новый заказ №{}\nПокупатель: {} (id {}{})\nТелефон: {}\n\n",
        receipt.order_id,
        name,
        user_id,
        username.map(|u| format!(", @{}", u)).unwrap_or_default(),
        phone,
    );
    for line in &receipt.lines {
        text.push_str(&format!(
            "• {} ({}) — {} шт. × {} ₽\n",
            line.name,
            line.attributes(),
            line.quantity,
            format_price(line.price),
        ));
    }
    text.push_str(&format!("\nИтого: {} ₽", format_price(receipt.total)));

    notify_admins_text(bot, &text).await;
}

/// Forwards an individual request message to the admins.
pub async fn notify_admins_individual_request(
    bot: &Bot,
    user_id: i64,
    username: Option<&str>,
    text: &str,
) {
    let notice = format!(
        "📝 Индивидуальный запрос от id {}{}:\n\n{}",
        user_id,
        username.map(|u| format!(" (@{})", u)).unwrap_or_default(),
        text,
    );
    notify_admins_text(bot, &notice).await;
}
