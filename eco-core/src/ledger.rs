use chrono::{Local, Utc};
use eco_types::{
    Achievement, AchievementProgress, Activity, DetectionRecord, EpochMillis, LedgerSnapshot,
    NewDetection, PeriodTotals, RankProgress, RedeemError, Redemption, Reward,
    RewardAvailability, Session, SessionStats, UserStats, WeeklyStats,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    EcoConfig, GamificationEngine, LedgerEvent, LedgerEventBus, LedgerEventHandler,
    LedgerStorage, RewardCalculator, activity, aggregation, default_achievements,
    default_rewards, impact, scoped_key,
};

fn now_millis() -> EpochMillis {
    Utc::now().timestamp_millis()
}

/// Bottles and scans counted since `start_session`.
#[derive(Debug, Clone, PartialEq)]
struct ScanningSession {
    started_at: EpochMillis,
    ended_at: Option<EpochMillis>,
    bottles: u64,
    scans: u32,
}

/// Append-only detection ledger for one user.
///
/// Aggregates are recomputed from the records on every read. Each append is
/// mirrored to storage on a best-effort basis: a failed write is logged and
/// the in-memory ledger carries on.
pub struct LedgerStore<S: LedgerStorage> {
    session: Session,
    storage: S,
    storage_key: String,
    records: Vec<DetectionRecord>,
    redemptions: Vec<Redemption>,
    achievements: Vec<Achievement>,
    reward_catalog: Vec<Reward>,
    event_bus: LedgerEventBus,
    scanning_session: Option<ScanningSession>,
}

impl<S: LedgerStorage> LedgerStore<S> {
    pub fn new(session: Session, storage: S, storage_key: &str) -> Self {
        let storage_key = scoped_key(storage_key, session.user_id);
        Self {
            session,
            storage,
            storage_key,
            records: Vec::new(),
            redemptions: Vec::new(),
            achievements: default_achievements(),
            reward_catalog: default_rewards(),
            event_bus: LedgerEventBus::new(),
            scanning_session: None,
        }
    }

    /// Restore the user's ledger from storage. A missing or unreadable
    /// snapshot starts an empty ledger.
    pub async fn load(session: Session, storage: S, storage_key: &str) -> Self {
        let mut store = Self::new(session, storage, storage_key);

        match store.storage.load(&store.storage_key).await {
            Ok(Some(snapshot)) => {
                info!(
                    "Restored ledger {} with {} records",
                    store.storage_key,
                    snapshot.records.len()
                );
                store.records = snapshot.records;
                store.redemptions = snapshot.redemptions;
            }
            Ok(None) => {
                debug!("No stored ledger for {}, starting empty", store.storage_key);
            }
            Err(e) => {
                warn!(
                    "Failed to restore ledger {}: {}. Starting empty",
                    store.storage_key, e
                );
            }
        }

        store
    }

    /// Restore the ledger under the storage key from `config`.
    pub async fn open(session: Session, storage: S, config: &EcoConfig) -> Self {
        Self::load(session, storage, &config.storage_key).await
    }

    /// Catalog used to name redeemed rewards in the activity feed.
    pub fn with_rewards(mut self, rewards: Vec<Reward>) -> Self {
        self.reward_catalog = rewards;
        self
    }

    pub fn with_achievements(mut self, achievements: Vec<Achievement>) -> Self {
        self.achievements = achievements;
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn LedgerEventHandler>) {
        self.event_bus.add_handler(handler);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn records(&self) -> &[DetectionRecord] {
        &self.records
    }

    pub fn redemptions(&self) -> &[Redemption] {
        &self.redemptions
    }

    pub async fn add_detection(&mut self, detection: NewDetection) -> DetectionRecord {
        self.add_detection_at(detection, now_millis()).await
    }

    /// Append a detection stamped with an explicit creation time.
    pub async fn add_detection_at(
        &mut self,
        detection: NewDetection,
        timestamp: EpochMillis,
    ) -> DetectionRecord {
        if detection.bottles == 0 {
            warn!("Detection logged with zero bottles, counting it as one");
        }

        let before = self.stats();
        let record = RewardCalculator::create_record(detection, Uuid::new_v4(), timestamp);
        self.records.push(record.clone());

        if let Some(session) = self.scanning_session.as_mut() {
            if session.ended_at.is_none() {
                session.bottles += record.bottles as u64;
                session.scans += 1;
            }
        }

        debug!(
            "Added detection {} ({} bottles, {} points) to {}",
            record.id, record.bottles, record.points, self.storage_key
        );

        let user_id = self.session.user_id;
        self.event_bus.publish(LedgerEvent::DetectionAdded {
            user_id,
            record: record.clone(),
        });

        let after = self.stats();
        for achievement in GamificationEngine::newly_unlocked(&self.achievements, &before, &after) {
            info!("User {} unlocked achievement {}", user_id, achievement.id);
            self.event_bus
                .publish(LedgerEvent::AchievementUnlocked { user_id, achievement });
        }

        self.persist().await;
        record
    }

    /// Spend points on a reward. The redemption is appended next to the
    /// detections; earned totals are left untouched and only the balance
    /// goes down.
    pub async fn redeem_reward(&mut self, reward: &Reward) -> Result<Redemption, RedeemError> {
        let balance = self.stats().points_balance;
        if balance < reward.cost {
            return Err(RedeemError::InsufficientPoints {
                required: reward.cost,
                available: balance,
            });
        }

        let redemption = Redemption {
            id: Uuid::new_v4(),
            reward_id: reward.id.clone(),
            cost: reward.cost,
            timestamp: now_millis(),
        };
        self.redemptions.push(redemption.clone());

        info!(
            "User {} redeemed {} for {} points",
            self.session.user_id, reward.id, reward.cost
        );
        self.event_bus.publish(LedgerEvent::RewardRedeemed {
            user_id: self.session.user_id,
            redemption: redemption.clone(),
        });

        self.persist().await;
        Ok(redemption)
    }

    pub fn stats(&self) -> UserStats {
        aggregation::user_stats(&self.records, &self.redemptions)
    }

    pub fn achievements(&self) -> Vec<AchievementProgress> {
        GamificationEngine::evaluate_achievements(&self.achievements, &self.stats())
    }

    pub fn rewards(&self, catalog: &[Reward]) -> Vec<RewardAvailability> {
        GamificationEngine::evaluate_rewards(catalog, &self.stats())
    }

    pub fn rank(&self) -> RankProgress {
        impact::rank(&self.stats())
    }

    pub fn today_scans(&self) -> Vec<DetectionRecord> {
        aggregation::today_scans(&self.records, &Local::now())
    }

    pub fn weekly_stats(&self) -> WeeklyStats {
        aggregation::weekly_stats(&self.records, &Local::now())
    }

    pub fn monthly_stats(&self) -> PeriodTotals {
        aggregation::monthly_stats(&self.records, &Local::now())
    }

    pub fn recent_scans(&self, limit: usize) -> Vec<DetectionRecord> {
        aggregation::recent_scans(&self.records, limit)
    }

    pub fn activities(&self) -> Vec<Activity> {
        activity::activities(
            &self.records,
            &self.redemptions,
            &self.achievements,
            &self.reward_catalog,
        )
    }

    pub fn recent_activities(&self, limit: usize) -> Vec<Activity> {
        activity::recent_activities(&self.activities(), limit)
    }

    pub fn start_session(&mut self) {
        self.scanning_session = Some(ScanningSession {
            started_at: now_millis(),
            ended_at: None,
            bottles: 0,
            scans: 0,
        });
    }

    pub fn end_session(&mut self) {
        if let Some(session) = self.scanning_session.as_mut() {
            session.ended_at.get_or_insert_with(now_millis);
        }
    }

    pub fn session_stats(&self) -> SessionStats {
        match &self.scanning_session {
            Some(session) => {
                let end = session.ended_at.unwrap_or_else(now_millis);
                SessionStats {
                    bottles: session.bottles,
                    scans: session.scans,
                    duration_seconds: (end - session.started_at).max(0) as u64 / 1000,
                }
            }
            None => SessionStats::default(),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            records: self.records.clone(),
            redemptions: self.redemptions.clone(),
            stats: self.stats(),
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.save(&self.storage_key, &self.snapshot()).await {
            warn!("Failed to persist ledger {}: {}", self.storage_key, e);
        }
    }
}
