//! Catalog navigation and basket callbacks

use teloxide::prelude::*;

use super::types::HandlerDeps;
use crate::catalog::{self, CategoryKind, Dimension, ResolveStep};
use crate::checkout::{CheckoutForm, NAME_PROMPT};
use crate::core::money::format_price;
use crate::core::AppResult;
use crate::session::Navigation;
use crate::storage::basket;
use crate::storage::catalog::{
    find_item, get_category, list_categories, list_dimension_values, list_models, Item,
};
use crate::storage::db::ensure_user;
use crate::storage::get_connection;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::keyboards;

const SESSION_EXPIRED: &str = "Сессия истекла. Откройте каталог заново: /menu";

fn dimension_prompt(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Color => "Выберите цвет:",
        Dimension::Memory => "Выберите объем памяти:",
        Dimension::ScreenSize => "Выберите размер экрана:",
        Dimension::Connectivity => "Выберите тип подключения:",
        Dimension::Ram => "Выберите объем оперативной памяти:",
    }
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> AppResult<()> {
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(action) = CallbackAction::parse(data) else {
        log::debug!("Ignoring unknown callback data: {}", data);
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let telegram_id = i64::try_from(q.from.id.0).unwrap_or_default();
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(telegram_id));

    bot.answer_callback_query(q.id).await?;
    deps.sessions.purge_expired();

    match action {
        CallbackAction::OpenCatalog | CallbackAction::BackToCategories => {
            show_categories(&bot, &deps, chat_id, telegram_id).await?;
        }
        CallbackAction::Category(category_id) => {
            open_category(&bot, &deps, chat_id, telegram_id, category_id).await?;
        }
        CallbackAction::Model(model_id) => {
            let mut kind = None;
            deps.sessions.update(telegram_id, |s| {
                if let Some(nav) = s.nav.as_mut() {
                    nav.model_id = Some(model_id);
                    nav.selection = Default::default();
                    kind = Some(nav.kind);
                }
            });
            match kind {
                Some(kind) => ask_or_show(&bot, &deps, chat_id, telegram_id, kind, model_id).await?,
                None => {
                    bot.send_message(chat_id, SESSION_EXPIRED).await?;
                }
            }
        }
        CallbackAction::BackToModels => {
            let category_id = deps.sessions.get(telegram_id).nav.map(|n| n.category_id);
            match category_id {
                Some(category_id) => {
                    open_category(&bot, &deps, chat_id, telegram_id, category_id).await?
                }
                None => show_categories(&bot, &deps, chat_id, telegram_id).await?,
            }
        }
        CallbackAction::Pick(dim, value_id) => {
            let mut nav_state = None;
            deps.sessions.update(telegram_id, |s| {
                if let Some(nav) = s.nav.as_mut() {
                    if nav.kind.dimensions().contains(&dim) {
                        nav.selection.set(dim, value_id);
                    }
                    nav_state = nav.model_id.map(|m| (nav.kind, m));
                }
            });
            match nav_state {
                Some((kind, model_id)) => {
                    ask_or_show(&bot, &deps, chat_id, telegram_id, kind, model_id).await?
                }
                None => {
                    bot.send_message(chat_id, SESSION_EXPIRED).await?;
                }
            }
        }
        CallbackAction::BackToDimension(dim) => {
            let mut nav_state = None;
            deps.sessions.update(telegram_id, |s| {
                if let Some(nav) = s.nav.as_mut() {
                    // Drop this dimension and everything picked after it
                    let dims = nav.kind.dimensions();
                    if let Some(pos) = dims.iter().position(|&d| d == dim) {
                        for &later in &dims[pos..] {
                            nav.selection.clear(later);
                        }
                    }
                    nav_state = nav.model_id.map(|m| (nav.kind, m));
                }
            });
            match nav_state {
                Some((kind, model_id)) => {
                    ask_or_show(&bot, &deps, chat_id, telegram_id, kind, model_id).await?
                }
                None => {
                    bot.send_message(chat_id, SESSION_EXPIRED).await?;
                }
            }
        }
        CallbackAction::AddToBasket(item_id) => {
            let _guard = deps.user_locks.acquire(telegram_id).await;
            let added = {
                let conn = get_connection(&deps.db_pool)?;
                ensure_user(&conn, telegram_id, q.from.username.as_deref())?;
                basket::add_item(&conn, telegram_id, item_id)?
            };
            if added {
                bot.send_message(chat_id, "✅ Товар добавлен в корзину.").await?;
            } else {
                log::warn!("User {} tried to add missing item {}", telegram_id, item_id);
                bot.send_message(chat_id, "Этот товар больше недоступен.").await?;
            }
        }
        CallbackAction::OpenBasket => {
            show_basket(&bot, &deps, chat_id, telegram_id).await?;
        }
        CallbackAction::RemoveFromBasket(item_id) => {
            {
                let _guard = deps.user_locks.acquire(telegram_id).await;
                let conn = get_connection(&deps.db_pool)?;
                basket::remove_item(&conn, telegram_id, item_id)?;
            }
            show_basket(&bot, &deps, chat_id, telegram_id).await?;
        }
        CallbackAction::ClearBasket => {
            {
                let _guard = deps.user_locks.acquire(telegram_id).await;
                let conn = get_connection(&deps.db_pool)?;
                basket::clear_basket(&conn, telegram_id)?;
            }
            bot.send_message(chat_id, "🗑 Корзина очищена.").await?;
        }
        CallbackAction::Checkout => {
            let lines = {
                let conn = get_connection(&deps.db_pool)?;
                basket::list_basket(&conn, telegram_id)?
            };
            if lines.is_empty() {
                bot.send_message(chat_id, "Корзина пуста, оформлять нечего.").await?;
                return Ok(());
            }
            deps.sessions.update(telegram_id, |s| {
                s.checkout = Some(CheckoutForm::new());
                s.pending_request = false;
            });
            bot.send_message(chat_id, NAME_PROMPT)
                .reply_markup(keyboards::checkout_cancel())
                .await?;
        }
        CallbackAction::IndividualRequest => {
            deps.sessions.update(telegram_id, |s| {
                s.pending_request = true;
                s.checkout = None;
            });
            let mut text =
                String::from("📝 Опишите, какой товар Вы ищете, одним сообщением. Мы свяжемся с Вами.");
            if let Some(manager) = crate::core::config::admin::MANAGER_CONTACT.as_deref() {
                text.push_str(&format!("\n\nИли напишите менеджеру напрямую: {}", manager));
            }
            bot.send_message(chat_id, text).await?;
        }
    }
    Ok(())
}

async fn show_categories(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    telegram_id: i64,
) -> AppResult<()> {
    let categories = {
        let conn = get_connection(&deps.db_pool)?;
        list_categories(&conn)?
    };
    deps.sessions.update(telegram_id, |s| s.nav = None);

    if categories.is_empty() {
        bot.send_message(chat_id, "Каталог пока пуст.").await?;
        return Ok(());
    }
    bot.send_message(chat_id, "Выберите категорию:")
        .reply_markup(keyboards::categories(&categories))
        .await?;
    Ok(())
}

async fn open_category(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    telegram_id: i64,
    category_id: i64,
) -> AppResult<()> {
    let (category, models) = {
        let conn = get_connection(&deps.db_pool)?;
        (get_category(&conn, category_id)?, list_models(&conn, category_id)?)
    };
    let Some(category) = category else {
        bot.send_message(chat_id, "Категория не найдена.").await?;
        return Ok(());
    };

    deps.sessions.update(telegram_id, |s| {
        s.nav = Some(Navigation {
            category_id: category.id,
            kind: category.kind,
            model_id: None,
            selection: Default::default(),
        });
    });

    if models.is_empty() {
        bot.send_message(chat_id, "В этой категории пока нет моделей.").await?;
        return Ok(());
    }
    bot.send_message(chat_id, format!("{}. Выберите модель:", category.name))
        .reply_markup(keyboards::models(&models))
        .await?;
    Ok(())
}

/// Continues the question sequence: asks the next unset dimension or shows
/// the resolved item card.
async fn ask_or_show(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    telegram_id: i64,
    kind: CategoryKind,
    model_id: i64,
) -> AppResult<()> {
    let selection = deps
        .sessions
        .get(telegram_id)
        .nav
        .map(|n| n.selection)
        .unwrap_or_default();

    match catalog::next_step(kind, model_id, &selection) {
        ResolveStep::Ask(dim) => {
            let values = {
                let conn = get_connection(&deps.db_pool)?;
                list_dimension_values(&conn, dim, model_id)?
            };
            if values.is_empty() {
                bot.send_message(chat_id, "Для этой модели нет доступных вариантов.")
                    .await?;
                return Ok(());
            }
            let previous = catalog::previous_dimension(kind, dim);
            bot.send_message(chat_id, dimension_prompt(dim))
                .reply_markup(keyboards::dimension_values(dim, &values, previous))
                .await?;
        }
        ResolveStep::Lookup(key) => {
            let item = {
                let conn = get_connection(&deps.db_pool)?;
                find_item(&conn, &key)?
            };
            let previous = kind.dimensions().last().copied();
            match item {
                Some(item) => send_item_card(bot, chat_id, &item, previous).await?,
                None => {
                    bot.send_message(chat_id, "К сожалению, такой комплектации нет в наличии.")
                        .reply_markup(keyboards::item_card_missing(previous))
                        .await?;
                }
            }
        }
    }
    Ok(())
}

async fn send_item_card(
    bot: &Bot,
    chat_id: ChatId,
    item: &Item,
    previous: Option<Dimension>,
) -> AppResult<()> {
    let mut text = item.name.clone();
    if !item.description.is_empty() {
        text.push_str("\n\n");
        text.push_str(&item.description);
    }
    text.push_str(&format!("\n\nЦена: {} ₽", format_price(item.price)));

    let keyboard = keyboards::item_card(item.id, previous);
    match item.image_url.as_deref().and_then(|u| url::Url::parse(u).ok()) {
        Some(image) => {
            bot.send_photo(chat_id, teloxide::types::InputFile::url(image))
                .caption(text)
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
    }
    Ok(())
}

async fn show_basket(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    telegram_id: i64,
) -> AppResult<()> {
    let lines = {
        let conn = get_connection(&deps.db_pool)?;
        basket::list_basket(&conn, telegram_id)?
    };
    let total = basket::basket_total(&lines);
    bot.send_message(chat_id, keyboards::basket_text(&lines, total))
        .reply_markup(keyboards::basket(&lines))
        .await?;
    Ok(())
}
