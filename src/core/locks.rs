//! Per-user write serialization
//!
//! Basket mutations are two storage round-trips (read then upsert), so two
//! rapid taps on «Добавить в корзину» from the same user could interleave
//! and lose an increment. Every handler that mutates a user's rows takes
//! that user's mutex first; different users never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user async mutexes.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one user, creating it on first use.
    ///
    /// The guard is owned, so it can be held across `.await` points while
    /// the handler talks to the database. Entries nobody holds anymore
    /// (the map's `Arc` is the only reference left) are swept here, so the
    /// registry stays proportional to the users mutating right now.
    pub async fn acquire(&self, telegram_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|&id, lock| id == telegram_id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(telegram_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of users with a resident lock entry.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
