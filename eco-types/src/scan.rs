use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::NewDetection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScanPhase {
    Idle,
    Scanning,    // progress animation running, no image captured yet
    Analyzing,   // image captured, waiting on detection
    Complete,    // outcome available
    RewardShown, // reward popup open
    Recorded,    // outcome appended to the ledger
    Discarded,
}

impl ScanPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Recorded | ScanPhase::Discarded)
    }
}

/// A processed detection ready to be shown in the reward popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanOutcome {
    pub bottles: u32,
    pub size: String,
    pub color: String,
    pub material: String,
    pub confidence: u8, // percent
    pub from_fallback: bool,
}

impl ScanOutcome {
    pub fn to_new_detection(&self) -> NewDetection {
        NewDetection::scanned(self.bottles, self.confidence).with_description(
            &self.size,
            &self.color,
            &self.material,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub progress: f64, // 0 - 100
    pub step: String,
}
