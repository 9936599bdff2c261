//! Inline and reply keyboard builders

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    KeyboardRemove,
};

use crate::catalog::Dimension;
use crate::checkout::CANCEL_TEXT;
use crate::core::money::format_price;
use crate::storage::basket::BasketLine;
use crate::storage::catalog::{Category, DimensionValue, Model};
use crate::telegram::callbacks::CallbackAction;

pub const BACK_LABEL: &str = "⬅️ Назад";

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.encode())
}

/// Main menu shown by /start and /menu.
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("🛍 Каталог", CallbackAction::OpenCatalog)],
        vec![button("🛒 Корзина", CallbackAction::OpenBasket)],
        vec![button("📝 Индивидуальный запрос", CallbackAction::IndividualRequest)],
    ])
}

pub fn categories(list: &[Category]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = list
        .iter()
        .map(|c| vec![button(&c.name, CallbackAction::Category(c.id))])
        .collect();
    rows.push(vec![button("🛒 Корзина", CallbackAction::OpenBasket)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn models(list: &[Model]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = list
        .iter()
        .map(|m| vec![button(&m.name, CallbackAction::Model(m.id))])
        .collect();
    rows.push(vec![button(BACK_LABEL, CallbackAction::BackToCategories)]);
    InlineKeyboardMarkup::new(rows)
}

/// Value picker for one attribute dimension.
///
/// «Назад» re-asks the previous dimension, or returns to model selection
/// when this is the first question.
pub fn dimension_values(
    dim: Dimension,
    values: &[DimensionValue],
    previous: Option<Dimension>,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = values
        .iter()
        .map(|v| vec![button(&v.label, CallbackAction::Pick(dim, v.id))])
        .collect();
    let back = match previous {
        Some(prev) => CallbackAction::BackToDimension(prev),
        None => CallbackAction::BackToModels,
    };
    rows.push(vec![button(BACK_LABEL, back)]);
    InlineKeyboardMarkup::new(rows)
}

/// Item card actions.
pub fn item_card(item_id: i64, previous: Option<Dimension>) -> InlineKeyboardMarkup {
    let back = match previous {
        Some(prev) => CallbackAction::BackToDimension(prev),
        None => CallbackAction::BackToModels,
    };
    InlineKeyboardMarkup::new(vec![
        vec![button("➕ Добавить в корзину", CallbackAction::AddToBasket(item_id))],
        vec![button("🛒 Корзина", CallbackAction::OpenBasket)],
        vec![button(BACK_LABEL, back)],
    ])
}

/// Shown instead of the item card when the selection has no stock.
pub fn item_card_missing(previous: Option<Dimension>) -> InlineKeyboardMarkup {
    let back = match previous {
        Some(prev) => CallbackAction::BackToDimension(prev),
        None => CallbackAction::BackToModels,
    };
    InlineKeyboardMarkup::new(vec![vec![button(BACK_LABEL, back)]])
}

/// Basket view: one removal button per position plus the flow actions.
pub fn basket(lines: &[BasketLine]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = lines
        .iter()
        .map(|line| {
            vec![button(
                format!("❌ {} ({} шт.)", line.name, line.quantity),
                CallbackAction::RemoveFromBasket(line.item_id),
            )]
        })
        .collect();
    rows.push(vec![button("✅ Оформить заказ", CallbackAction::Checkout)]);
    rows.push(vec![button("🗑 Очистить корзину", CallbackAction::ClearBasket)]);
    rows.push(vec![button(BACK_LABEL, CallbackAction::BackToCategories)]);
    InlineKeyboardMarkup::new(rows)
}

/// Reply keyboard shown while the checkout form is active.
pub fn checkout_cancel() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(CANCEL_TEXT)]])
        .resize_keyboard()
        .one_time_keyboard()
}

/// Contact-share keyboard for the phone step.
pub fn share_phone() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new("📱 Отправить мой номер").request(ButtonRequest::Contact)
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

pub fn remove_reply_keyboard() -> KeyboardRemove {
    KeyboardRemove::new()
}

/// Text of the basket summary message.
pub fn basket_text(lines: &[BasketLine], total: rust_decimal::Decimal) -> String {
    if lines.is_empty() {
        return "🛒 Ваша корзина пуста.".to_string();
    }
    let mut text = String::from("🛒 Ваша корзина:\n\n");
    for line in lines {
        text.push_str(&format!(
            "• {} ({}) — {} шт. × {} ₽ = {} ₽\n",
            line.name,
            line.attributes(),
            line.quantity,
            format_price(line.price),
            format_price(line.total()),
        ));
    }
    text.push_str(&format!("\nИтого: {} ₽", format_price(total)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::money::parse_price;

    #[test]
    fn basket_text_shows_resolved_attribute_labels() {
        let lines = vec![
            BasketLine {
                item_id: 1,
                name: "iPhone 15".into(),
                price: parse_price("99990").unwrap(),
                quantity: 2,
                color: "Черный".into(),
                memory: Some("128 GB".into()),
                screen_size: None,
                connectivity: None,
                ram: None,
            },
            BasketLine {
                item_id: 5,
                name: "AirPods Pro".into(),
                price: parse_price("24990").unwrap(),
                quantity: 1,
                color: "Белый".into(),
                memory: None,
                screen_size: None,
                connectivity: None,
                ram: None,
            },
        ];

        let text = basket_text(&lines, parse_price("224970").unwrap());
        assert!(text.contains("iPhone 15 (Черный, 128 GB) — 2 шт."));
        assert!(text.contains("AirPods Pro (Белый) — 1 шт."));
        assert!(text.contains("Итого: 224970 ₽"));
    }
}
