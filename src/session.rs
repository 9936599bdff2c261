//! Per-user session state
//!
//! Holds catalog navigation position and an in-progress checkout form,
//! keyed by telegram id. Entries expire after a TTL and the map is capped;
//! when full, the stalest entry is evicted so memory stays bounded no
//! matter how many users poke the bot.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::catalog::{CategoryKind, Selection};
use crate::checkout::CheckoutForm;

/// Where the user is in the catalog.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub category_id: i64,
    pub kind: CategoryKind,
    pub model_id: Option<i64>,
    pub selection: Selection,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub nav: Option<Navigation>,
    pub checkout: Option<CheckoutForm>,
    /// The next text message is an individual request for the admins
    pub pending_request: bool,
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Bounded, TTL-expiring map of user sessions.
pub struct SessionStore {
    entries: Mutex<HashMap<i64, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Snapshot of the user's session, dropping it first if expired.
    pub fn get(&self, telegram_id: i64) -> Session {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(&telegram_id) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => entry.session.clone(),
            Some(_) => {
                entries.remove(&telegram_id);
                Session::default()
            }
            None => Session::default(),
        }
    }

    /// Mutates the user's session in place, refreshing its TTL.
    pub fn update<F>(&self, telegram_id: i64, f: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let expired = entries
            .get(&telegram_id)
            .is_some_and(|e| e.last_seen.elapsed() >= self.ttl);
        if expired {
            entries.remove(&telegram_id);
        }

        if !entries.contains_key(&telegram_id) && entries.len() >= self.capacity {
            Self::evict_stalest(&mut entries);
        }

        let entry = entries.entry(telegram_id).or_insert_with(|| Entry {
            session: Session::default(),
            last_seen: Instant::now(),
        });
        f(&mut entry.session);
        entry.last_seen = Instant::now();
    }

    /// Drops the user's session entirely.
    pub fn clear(&self, telegram_id: i64) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&telegram_id);
    }

    /// Removes every expired entry. Called opportunistically by handlers.
    pub fn purge_expired(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, e| e.last_seen.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_stalest(entries: &mut HashMap<i64, Entry>) {
        if let Some(&stalest) = entries
            .iter()
            .min_by_key(|(_, e)| e.last_seen)
            .map(|(id, _)| id)
        {
            entries.remove(&stalest);
        }
    }
}
