//! Bot initialization and command definitions

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "показывает главное меню")]
    Start,
    #[command(description = "каталог и корзина")]
    Menu,
    #[command(description = "справка по боту")]
    Help,
    #[command(description = "выгрузить прайс-лист (только для администраторов)")]
    ExportPrices,
}

/// Creates a Bot instance from the configured token.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN environment variable not set");
    }
    Ok(Bot::new(token))
}

/// Sets up bot commands in the Telegram UI. Admin-only commands are
/// deliberately left out of the visible list.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "показывает главное меню"),
        BotCommand::new("menu", "каталог и корзина"),
        BotCommand::new("help", "справка по боту"),
    ])
    .await?;
    Ok(())
}
