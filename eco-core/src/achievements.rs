use eco_types::{
    Achievement, AchievementMetric, AchievementProgress, Rarity, Reward, RewardAvailability,
    UserStats,
};

/// Achievements shown on the individual dashboard.
pub fn default_achievements() -> Vec<Achievement> {
    vec![
        achievement(
            "first_steps",
            "First Steps",
            "Collect your first 10 bottles",
            AchievementMetric::TotalBottles,
            10.0,
            Rarity::Common,
        ),
        achievement(
            "eco_warrior",
            "Eco Warrior",
            "Reach 50 bottles collected",
            AchievementMetric::TotalBottles,
            50.0,
            Rarity::Rare,
        ),
        achievement(
            "ocean_guardian",
            "Ocean Guardian",
            "Save 5kg of CO₂",
            AchievementMetric::TotalCo2Saved,
            5.0,
            Rarity::Epic,
        ),
        achievement(
            "recycling_master",
            "Recycling Master",
            "Reach 1000 total bottles collected",
            AchievementMetric::TotalBottles,
            1000.0,
            Rarity::Legendary,
        ),
    ]
}

pub fn default_rewards() -> Vec<Reward> {
    vec![
        reward("coffee_voucher", "Coffee Voucher", "Free coffee at local café", 50, "Food & Beverage", 30),
        reward("ferry_ticket", "Ferry Ticket", "50% off inter-island ferry", 200, "Transportation", 90),
        reward("mobile_data", "Mobile Data", "1GB free mobile data", 100, "Digital Services", 7),
        reward("eco_store_discount", "Eco Store Discount", "20% off sustainable products", 150, "Shopping", 60),
    ]
}

fn achievement(
    id: &str,
    title: &str,
    description: &str,
    metric: AchievementMetric,
    threshold: f64,
    rarity: Rarity,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        metric,
        threshold,
        rarity,
    }
}

fn reward(id: &str, title: &str, description: &str, cost: u64, category: &str, expiry_days: u32) -> Reward {
    Reward {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        cost,
        category: category.to_string(),
        expiry_days,
    }
}

pub struct GamificationEngine;

impl GamificationEngine {
    pub fn metric_value(stats: &UserStats, metric: AchievementMetric) -> f64 {
        match metric {
            AchievementMetric::TotalBottles => stats.total_bottles as f64,
            AchievementMetric::TotalCo2Saved => stats.total_co2_saved,
            AchievementMetric::TotalPoints => stats.total_points as f64,
        }
    }

    /// Progress is clamped to the threshold so an overshooting stat still
    /// renders as a full bar rather than past it.
    pub fn evaluate_achievement(achievement: &Achievement, stats: &UserStats) -> AchievementProgress {
        let value = Self::metric_value(stats, achievement.metric);

        AchievementProgress {
            achievement: achievement.clone(),
            progress: value.min(achievement.threshold),
            max_progress: achievement.threshold,
            unlocked: value >= achievement.threshold,
        }
    }

    pub fn evaluate_achievements(catalog: &[Achievement], stats: &UserStats) -> Vec<AchievementProgress> {
        catalog
            .iter()
            .map(|a| Self::evaluate_achievement(a, stats))
            .collect()
    }

    pub fn evaluate_rewards(catalog: &[Reward], stats: &UserStats) -> Vec<RewardAvailability> {
        catalog
            .iter()
            .map(|reward| RewardAvailability {
                reward: reward.clone(),
                available: stats.points_balance >= reward.cost,
            })
            .collect()
    }

    /// Achievements locked under `before` and unlocked under `after`.
    pub fn newly_unlocked(catalog: &[Achievement], before: &UserStats, after: &UserStats) -> Vec<Achievement> {
        catalog
            .iter()
            .filter(|a| {
                !Self::evaluate_achievement(a, before).unlocked
                    && Self::evaluate_achievement(a, after).unlocked
            })
            .cloned()
            .collect()
    }
}
