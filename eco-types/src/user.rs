use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum UserRole {
    Individual,
    Collector,
    Hub,
    Institution,
    Depot,
}

/// Identity supplied by the authentication layer. Read-only to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub role: UserRole,
}
