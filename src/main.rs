use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use malachite_bot::cli::{Cli, Commands};
use malachite_bot::core::locks::UserLocks;
use malachite_bot::core::{config, init_logger};
use malachite_bot::session::SessionStore;
use malachite_bot::storage::{create_pool, get_connection, migrations};
use malachite_bot::telegram::admin::write_price_sheet;
use malachite_bot::telegram::broadcast::{broadcast_to_all, start_broadcast_task};
use malachite_bot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use malachite_bot::storage::catalog::list_price_rows;

const MAX_DISPATCHER_RETRIES: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log dispatcher panics instead of terminating
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    let _ = dotenv();

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::ExportPrices { output }) => run_export_prices(output).await,
        Some(Commands::Broadcast { message, image }) => run_broadcast(message, image).await,
    }
}

/// Export the price sheet to a file without starting the bot.
async fn run_export_prices(output: Option<String>) -> Result<()> {
    let db_pool = create_pool(&config::DATABASE_PATH)?;
    {
        let mut conn = get_connection(&db_pool)?;
        migrations::run_migrations(&mut conn)?;
    }

    let path = output.unwrap_or_else(|| config::admin::PRICES_EXPORT_PATH.clone());
    let rows = {
        let conn = get_connection(&db_pool)?;
        list_price_rows(&conn)?
    };
    let file = std::fs::File::create(&path)?;
    write_price_sheet(&rows, file)?;
    log::info!("Exported {} price rows to {}", rows.len(), path);
    println!("Exported {} rows to {}", rows.len(), path);
    Ok(())
}

/// One-off broadcast from the command line.
async fn run_broadcast(message: String, image: Option<String>) -> Result<()> {
    let db_pool = create_pool(&config::DATABASE_PATH)?;
    {
        let mut conn = get_connection(&db_pool)?;
        migrations::run_migrations(&mut conn)?;
    }

    let bot = create_bot()?;
    let report = broadcast_to_all(&bot, &db_pool, &message, image.as_deref()).await?;
    println!("Broadcast done: {} sent, {} failed", report.sent, report.failed);
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;

    // Retry if the Bot API is still initializing
    let bot_info = {
        let startup_max_retries = 60;
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    startup_retry += 1;
                    if startup_retry >= startup_max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        startup_retry,
                        startup_max_retries,
                        e
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    {
        let mut conn = get_connection(&db_pool)?;
        migrations::run_migrations(&mut conn)?;
    }

    let sessions = Arc::new(SessionStore::new(
        config::session::ttl(),
        config::session::MAX_ENTRIES,
    ));
    let user_locks = Arc::new(UserLocks::new());

    start_broadcast_task(bot.clone(), Arc::clone(&db_pool));

    let deps = HandlerDeps::new(Arc::clone(&db_pool), sessions, user_locks);
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");

    // Run the dispatcher with retry logic; panics are isolated in a task
    let mut retry_count = 0;
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);
                }
                retry_count += 1;
                if retry_count > MAX_DISPATCHER_RETRIES {
                    return Err(anyhow::anyhow!(
                        "Dispatcher failed {} times, giving up",
                        retry_count
                    ));
                }
                log::warn!(
                    "Restarting dispatcher (attempt {}/{})...",
                    retry_count,
                    MAX_DISPATCHER_RETRIES
                );
                sleep(Duration::from_secs(5)).await;
            }
        }
    }

    Ok(())
}
