use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DetectionRecord, EpochMillis, Redemption};

/// Aggregate over a user's ledger. Always derived, never ground truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub total_bottles: u64,
    pub total_points: u64,
    pub total_co2_saved: f64,
    pub total_earnings: f64,
    pub total_poly_money: u64,
    pub total_scans: u64,
    pub average_confidence: f64,
    pub best_scan: Option<BestScan>,
    pub last_scan_at: Option<EpochMillis>,
    pub redeemed_points: u64,
    pub points_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BestScan {
    pub bottles: u32,
    pub timestamp: EpochMillis,
    pub confidence: u8,
}

/// Sums over a trailing time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodTotals {
    pub bottles: u64,
    pub points: u64,
    pub poly_money: u64,
    pub earnings: f64,
    pub co2_saved: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeeklyStats {
    pub totals: PeriodTotals,
    pub streak: u32,
    pub longest_streak: u32,
}

/// Tally of a single uninterrupted scanning session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionStats {
    pub bottles: u64,
    pub scans: u32,
    pub duration_seconds: u64,
}

/// Everyday equivalents of a user's collection totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EnvironmentalImpact {
    pub co2_saved_kg: f64,
    pub trees_planted: u64,
    pub car_miles_saved: u64,
    pub electricity_saved_kwh: u64,
    pub ocean_waste_prevented: u64,
    pub landfill_space_saved: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Milestone {
    pub current: f64,
    pub next: f64,
    pub progress: f64, // fraction of the way from the previous milestone, 0.0 - 1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Milestones {
    pub bottles: Milestone,
    pub co2: Milestone,
    pub points: Milestone,
}

/// What gets written to per-device storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSnapshot {
    pub records: Vec<DetectionRecord>,
    #[serde(default)]
    pub redemptions: Vec<Redemption>,
    #[serde(default)]
    pub stats: UserStats,
}
