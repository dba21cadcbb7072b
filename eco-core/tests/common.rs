#![allow(dead_code)]

use eco_core::{LedgerEvent, LedgerEventHandler, LedgerStorage, LedgerStore, MemoryStorage};
use eco_types::{Session, UserRole};
use std::sync::{Arc, Mutex};

pub const TEST_STORAGE_KEY: &str = "ecotrack-test";

/// Creates a session for an individual recycler
pub fn create_test_session(name: &str) -> Session {
    Session {
        user_id: uuid::Uuid::new_v4(),
        display_name: name.to_string(),
        role: UserRole::Individual,
    }
}

/// Creates an empty ledger backed by in-memory storage
pub fn create_test_ledger() -> LedgerStore<MemoryStorage> {
    LedgerStore::new(
        create_test_session("Alice"),
        MemoryStorage::new(),
        TEST_STORAGE_KEY,
    )
}

/// Creates an empty ledger over the given storage
pub fn create_ledger_with<S: LedgerStorage>(session: Session, storage: S) -> LedgerStore<S> {
    LedgerStore::new(session, storage, TEST_STORAGE_KEY)
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<LedgerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn count_matching(&self, check_fn: impl Fn(&LedgerEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| check_fn(e)).count()
    }
}

impl LedgerEventHandler for EventCollector {
    fn handle_event(&mut self, event: LedgerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Looks up an achievement's progress by id
pub fn achievement_progress<S: LedgerStorage>(
    ledger: &LedgerStore<S>,
    id: &str,
) -> eco_types::AchievementProgress {
    ledger
        .achievements()
        .into_iter()
        .find(|p| p.achievement.id == id)
        .unwrap_or_else(|| panic!("no achievement {}", id))
}
