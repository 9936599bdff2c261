use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: malachite.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "malachite.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: malachite.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "malachite.log".to_string()));

/// Administrator configuration
pub mod admin {
    use super::*;

    /// Telegram ids allowed to run price export/import and receiving order
    /// notifications. Read from ADMIN_IDS as a comma-separated list.
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    });

    /// Where the price export file is written by the CLI subcommand
    /// Read from PRICES_EXPORT_PATH environment variable
    pub static PRICES_EXPORT_PATH: Lazy<String> =
        Lazy::new(|| env::var("PRICES_EXPORT_PATH").unwrap_or_else(|_| "/tmp/prices_export.csv".to_string()));

    /// Manager handle shown on the individual request screen
    /// Read from MANAGER_CONTACT environment variable (e.g. @malachite_shop)
    pub static MANAGER_CONTACT: Lazy<Option<String>> = Lazy::new(|| env::var("MANAGER_CONTACT").ok());

    /// Returns true if the given Telegram id belongs to an administrator.
    pub fn is_admin(telegram_id: i64) -> bool {
        ADMIN_IDS.contains(&telegram_id)
    }
}

/// Session store configuration
pub mod session {
    use super::Duration;

    /// How long an idle navigation/checkout session survives
    pub const TTL_SECS: u64 = 30 * 60;

    /// Hard cap on resident sessions; the oldest are evicted beyond this
    pub const MAX_ENTRIES: usize = 10_000;

    /// Session TTL duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }
}

/// Broadcast (fan-out to all users) configuration
pub mod broadcast {
    use super::*;

    /// Fixed-size concurrency limit for outbound sends
    pub const MAX_CONCURRENT_SENDS: usize = 8;

    /// Interval between scheduled broadcasts, in hours.
    /// Read from BROADCAST_INTERVAL_HOURS; 0 disables the scheduler.
    pub static INTERVAL_HOURS: Lazy<u64> = Lazy::new(|| {
        env::var("BROADCAST_INTERVAL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0)
    });

    /// Message text for the scheduled broadcast
    pub static MESSAGE: Lazy<Option<String>> = Lazy::new(|| env::var("BROADCAST_MESSAGE").ok());

    /// Optional photo path attached to the scheduled broadcast
    pub static IMAGE_PATH: Lazy<Option<String>> = Lazy::new(|| env::var("BROADCAST_IMAGE").ok());
}
