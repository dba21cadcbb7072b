use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::EpochMillis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ActivityKind {
    Recycle,
    Reward,
    LevelUp,
}

/// One line of the dashboard's recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: EpochMillis,
}
