use eco_types::{Achievement, DetectionRecord, Redemption, UserId};

#[derive(Debug, Clone)]
pub enum LedgerEvent {
    DetectionAdded {
        user_id: UserId,
        record: DetectionRecord,
    },
    AchievementUnlocked {
        user_id: UserId,
        achievement: Achievement,
    },
    RewardRedeemed {
        user_id: UserId,
        redemption: Redemption,
    },
}

impl LedgerEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            LedgerEvent::DetectionAdded { user_id, .. } => *user_id,
            LedgerEvent::AchievementUnlocked { user_id, .. } => *user_id,
            LedgerEvent::RewardRedeemed { user_id, .. } => *user_id,
        }
    }
}

/// Event handler trait for reacting to ledger changes
pub trait LedgerEventHandler: Send {
    fn handle_event(&mut self, event: LedgerEvent);
}

/// Simple event bus for distributing ledger events
pub struct LedgerEventBus {
    handlers: Vec<Box<dyn LedgerEventHandler>>,
}

impl LedgerEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn LedgerEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: LedgerEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for LedgerEventBus {
    fn default() -> Self {
        Self::new()
    }
}
