//! Handler types and shared dependencies

use std::sync::Arc;

use crate::core::locks::UserLocks;
use crate::session::SessionStore;
use crate::storage::DbPool;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<SessionStore>,
    pub user_locks: Arc<UserLocks>,
}

impl HandlerDeps {
    pub fn new(db_pool: Arc<DbPool>, sessions: Arc<SessionStore>, user_locks: Arc<UserLocks>) -> Self {
        Self {
            db_pool,
            sessions,
            user_locks,
        }
    }
}
