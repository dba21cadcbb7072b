use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::ScanPhase;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScanError {
    #[error("cannot {action} while scan is {phase:?}")]
    InvalidTransition { phase: ScanPhase, action: String },
    #[error("scan result was already added to the ledger")]
    AlreadyRecorded,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RedeemError {
    #[error("reward costs {required} points but only {available} are available")]
    InsufficientPoints { required: u64, available: u64 },
}
