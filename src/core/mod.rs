//! Core utilities: configuration, errors, logging, validation, money

pub mod config;
pub mod error;
pub mod locks;
pub mod logging;
pub mod money;
pub mod validation;

pub use error::{AppError, AppResult};
pub use logging::init_logger;
