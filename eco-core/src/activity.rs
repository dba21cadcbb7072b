//! Recent-activity feed, rebuilt from what the ledger already stores.
//!
//! Level-ups are found by replaying the records in ledger order, so an
//! unlock is stamped with the time of the record that caused it.

use eco_types::{
    Achievement, Activity, ActivityKind, DetectionRecord, Redemption, Reward, UserStats,
};

use crate::{GamificationEngine, rank_for};

fn recycle_activity(record: &DetectionRecord) -> Activity {
    let noun = if record.bottles == 1 { "bottle" } else { "bottles" };
    Activity {
        id: format!("recycle:{}", record.id),
        kind: ActivityKind::Recycle,
        title: format!("Recycled {} {}", record.bottles, noun),
        description: format!(
            "+{} points, {:.1} kg CO₂ saved",
            record.points, record.co2_saved
        ),
        timestamp: record.timestamp,
    }
}

fn reward_activity(redemption: &Redemption, catalog: &[Reward]) -> Activity {
    let title = catalog
        .iter()
        .find(|r| r.id == redemption.reward_id)
        .map(|r| r.title.as_str())
        .unwrap_or(redemption.reward_id.as_str());

    Activity {
        id: format!("reward:{}", redemption.id),
        kind: ActivityKind::Reward,
        title: format!("Redeemed {}", title),
        description: format!("-{} points", redemption.cost),
        timestamp: redemption.timestamp,
    }
}

/// Every activity the ledger implies, in the order it was produced.
pub fn activities(
    records: &[DetectionRecord],
    redemptions: &[Redemption],
    achievements: &[Achievement],
    rewards: &[Reward],
) -> Vec<Activity> {
    let mut feed = Vec::new();
    let mut running = UserStats::default();

    for record in records {
        feed.push(recycle_activity(record));

        let before = running.clone();
        running.total_bottles += record.bottles as u64;
        running.total_points += record.points;
        running.total_co2_saved += record.co2_saved;

        for achievement in GamificationEngine::newly_unlocked(achievements, &before, &running) {
            feed.push(Activity {
                id: format!("achievement:{}", achievement.id),
                kind: ActivityKind::LevelUp,
                title: format!("Achievement unlocked: {}", achievement.title),
                description: achievement.description,
                timestamp: record.timestamp,
            });
        }

        let old_rank = rank_for(before.total_bottles);
        let new_rank = rank_for(running.total_bottles);
        if new_rank > old_rank {
            feed.push(Activity {
                id: format!("rank:{:?}", new_rank),
                kind: ActivityKind::LevelUp,
                title: format!("Reached {}", new_rank.title()),
                description: format!("{} bottles recycled", new_rank.threshold()),
                timestamp: record.timestamp,
            });
        }
    }

    feed.extend(redemptions.iter().map(|r| reward_activity(r, rewards)));
    feed
}

/// Newest `limit` activities. Entries sharing a timestamp come out latest
/// produced first.
pub fn recent_activities(feed: &[Activity], limit: usize) -> Vec<Activity> {
    let mut sorted: Vec<Activity> = feed.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RewardCalculator, default_achievements, default_rewards};
    use eco_types::NewDetection;
    use uuid::Uuid;

    fn record_at(bottles: u32, timestamp: i64) -> DetectionRecord {
        RewardCalculator::create_record(NewDetection::manual(bottles), Uuid::new_v4(), timestamp)
    }

    fn kinds(feed: &[Activity]) -> Vec<ActivityKind> {
        feed.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_empty_ledger_has_no_activity() {
        assert!(activities(&[], &[], &default_achievements(), &default_rewards()).is_empty());
    }

    #[test]
    fn test_one_entry_per_record() {
        let records = vec![record_at(1, 1_000), record_at(3, 2_000)];
        let feed = activities(&records, &[], &default_achievements(), &default_rewards());

        assert_eq!(kinds(&feed), vec![ActivityKind::Recycle, ActivityKind::Recycle]);
        assert_eq!(feed[0].title, "Recycled 1 bottle");
        assert_eq!(feed[1].title, "Recycled 3 bottles");
        assert_eq!(feed[1].description, "+15 points, 0.3 kg CO₂ saved");
    }

    #[test]
    fn test_level_up_at_crossing_record() {
        let records = vec![record_at(6, 1_000), record_at(6, 2_000), record_at(1, 3_000)];
        let feed = activities(&records, &[], &default_achievements(), &default_rewards());

        let level_ups: Vec<&Activity> = feed
            .iter()
            .filter(|a| a.kind == ActivityKind::LevelUp)
            .collect();
        assert_eq!(level_ups.len(), 2);
        assert_eq!(level_ups[0].title, "Achievement unlocked: First Steps");
        assert_eq!(level_ups[1].title, "Reached Ocean Guardian");
        assert!(level_ups.iter().all(|a| a.timestamp == 2_000));
    }

    #[test]
    fn test_redemption_uses_catalog_title() {
        let redemptions = vec![Redemption {
            id: Uuid::new_v4(),
            reward_id: "coffee_voucher".to_string(),
            cost: 50,
            timestamp: 5_000,
        }];
        let feed = activities(&[], &redemptions, &default_achievements(), &default_rewards());

        assert_eq!(feed[0].kind, ActivityKind::Reward);
        assert_eq!(feed[0].title, "Redeemed Coffee Voucher");
        assert_eq!(feed[0].description, "-50 points");

        let unknown = activities(&[], &redemptions, &default_achievements(), &[]);
        assert_eq!(unknown[0].title, "Redeemed coffee_voucher");
    }

    #[test]
    fn test_recent_activities_newest_first_and_bounded() {
        let records = vec![record_at(1, 1_000), record_at(1, 3_000), record_at(1, 2_000)];
        let redemptions = vec![Redemption {
            id: Uuid::new_v4(),
            reward_id: "mobile_data".to_string(),
            cost: 100,
            timestamp: 4_000,
        }];
        let feed = activities(&records, &redemptions, &default_achievements(), &default_rewards());

        let recent = recent_activities(&feed, 3);
        let timestamps: Vec<i64> = recent.iter().map(|a| a.timestamp).collect();
        assert_eq!(timestamps, vec![4_000, 3_000, 2_000]);
        assert_eq!(recent[0].kind, ActivityKind::Reward);

        assert_eq!(recent_activities(&feed, 100).len(), 4);
        assert!(recent_activities(&feed, 0).is_empty());
    }

    #[test]
    fn test_ties_list_level_up_before_its_record() {
        let records = vec![record_at(10, 1_000)];
        let feed = activities(&records, &[], &default_achievements(), &default_rewards());

        let recent = recent_activities(&feed, 10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[2].kind, ActivityKind::Recycle);
        assert_eq!(recent[0].title, "Reached Ocean Guardian");
    }
}
