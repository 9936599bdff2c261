use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent
/// error handling. Uses `thiserror` for automatic error conversion and
/// display formatting.
///
/// `NotFound` conditions in the catalog (missing model, color, item and so
/// on) are deliberately NOT errors: storage lookups return `Option` and the
/// handlers translate a miss into a friendly message. Only infrastructure
/// failures travel through `AppError`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Telegram file download errors (price sheet import)
    #[error("Download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Price export/import errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed decimal price in the items table
    #[error("Price error: {0}")]
    Price(#[from] rust_decimal::Error),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
