use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::EpochMillis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// The `UserStats` field an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AchievementMetric {
    TotalBottles,
    TotalCo2Saved,
    TotalPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub metric: AchievementMetric,
    pub threshold: f64,
    pub rarity: Rarity,
}

/// An achievement paired with its state for one stats snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub progress: f64,     // clamped to max_progress
    pub max_progress: f64, // == threshold
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reward {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cost: u64, // points
    pub category: String,
    pub expiry_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RewardAvailability {
    pub reward: Reward,
    pub available: bool,
}

/// Points spent on a reward. Appended alongside detections, never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Redemption {
    pub id: Uuid,
    pub reward_id: String,
    pub cost: u64,
    pub timestamp: EpochMillis,
}

/// Named tier on the lifetime bottle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Rank {
    EcoStarter,
    OceanGuardian,
    EcoWarrior,
    BlueEconomyHero,
    OceanLegend,
}

impl Rank {
    /// Lowest to highest.
    pub const ALL: [Rank; 5] = [
        Rank::EcoStarter,
        Rank::OceanGuardian,
        Rank::EcoWarrior,
        Rank::BlueEconomyHero,
        Rank::OceanLegend,
    ];

    /// Bottles needed to hold this rank.
    pub fn threshold(&self) -> u64 {
        match self {
            Rank::EcoStarter => 0,
            Rank::OceanGuardian => 10,
            Rank::EcoWarrior => 100,
            Rank::BlueEconomyHero => 500,
            Rank::OceanLegend => 1000,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Rank::EcoStarter => "Eco Starter",
            Rank::OceanGuardian => "Ocean Guardian",
            Rank::EcoWarrior => "Eco Warrior",
            Rank::BlueEconomyHero => "Blue Economy Hero",
            Rank::OceanLegend => "Ocean Legend",
        }
    }

    pub fn next(&self) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r > self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RankProgress {
    pub rank: Rank,
    pub next_rank: Option<Rank>,
    pub next_threshold: Option<u64>, // bottles
    pub progress: f64,               // 0.0 - 1.0 toward next_rank, 1.0 at the top
}
