use eco_types::{
    DEFAULT_COLOR, DEFAULT_MATERIAL, DEFAULT_SIZE, DetectionId, DetectionRecord, DetectionSource,
    EpochMillis, MANUAL_CONFIDENCE, NewDetection,
};

pub const POINTS_PER_BOTTLE: u64 = 5;
pub const POLY_MONEY_PER_BOTTLE: u64 = 5;
pub const EARNINGS_PER_BOTTLE: f64 = 0.05;
pub const CO2_KG_PER_BOTTLE: f64 = 0.1;

pub struct RewardCalculator;

impl RewardCalculator {
    pub fn points(bottles: u32) -> u64 {
        u64::from(bottles) * POINTS_PER_BOTTLE
    }

    pub fn poly_money(bottles: u32) -> u64 {
        u64::from(bottles) * POLY_MONEY_PER_BOTTLE
    }

    pub fn earnings(bottles: u32) -> f64 {
        bottles as f64 * EARNINGS_PER_BOTTLE
    }

    pub fn co2_saved(bottles: u32) -> f64 {
        bottles as f64 * CO2_KG_PER_BOTTLE
    }

    /// Turn caller input into a finished record.
    ///
    /// Missing descriptive fields fall back to the standard 330 ml clear PET
    /// bottle, missing reward fields are derived from `bottles`, and supplied
    /// reward fields are kept as-is. A bottle count of zero is raised to one.
    pub fn create_record(
        new: NewDetection,
        id: DetectionId,
        timestamp: EpochMillis,
    ) -> DetectionRecord {
        let bottles = new.bottles.max(1);

        let confidence = match new.source {
            DetectionSource::Manual => MANUAL_CONFIDENCE,
            DetectionSource::Scan => new.confidence.unwrap_or(0).min(100),
        };

        DetectionRecord {
            id,
            timestamp,
            bottles,
            size: new.size.unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            color: new.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            material: new.material.unwrap_or_else(|| DEFAULT_MATERIAL.to_string()),
            confidence,
            source: new.source,
            points: new.points.unwrap_or_else(|| Self::points(bottles)),
            earnings: new
                .earnings
                .filter(|e| e.is_finite())
                .unwrap_or_else(|| Self::earnings(bottles)),
            co2_saved: new
                .co2_saved
                .filter(|c| c.is_finite())
                .unwrap_or_else(|| Self::co2_saved(bottles)),
            poly_money: new.poly_money.unwrap_or_else(|| Self::poly_money(bottles)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rewards_derived_from_bottles() {
        let record = RewardCalculator::create_record(NewDetection::manual(3), Uuid::new_v4(), 0);

        assert_eq!(record.bottles, 3);
        assert_eq!(record.points, 15);
        assert_eq!(record.poly_money, 15);
        assert!(approx_eq(record.earnings, 0.15));
        assert!(approx_eq(record.co2_saved, 0.3));
    }

    #[test]
    fn test_explicit_reward_fields_preserved() {
        let mut new = NewDetection::scanned(2, 91);
        new.points = Some(40);
        new.earnings = Some(1.25);
        new.co2_saved = Some(0.5);
        new.poly_money = Some(7);

        let record = RewardCalculator::create_record(new, Uuid::new_v4(), 0);

        assert_eq!(record.points, 40);
        assert!(approx_eq(record.earnings, 1.25));
        assert!(approx_eq(record.co2_saved, 0.5));
        assert_eq!(record.poly_money, 7);
        assert_eq!(record.confidence, 91);
    }

    #[test]
    fn test_partial_reward_fields_fill_the_rest() {
        let mut new = NewDetection::manual(4);
        new.points = Some(100);

        let record = RewardCalculator::create_record(new, Uuid::new_v4(), 0);

        assert_eq!(record.points, 100);
        assert_eq!(record.poly_money, 20);
        assert!(approx_eq(record.earnings, 0.2));
    }

    #[test]
    fn test_non_finite_rewards_are_recomputed() {
        let mut new = NewDetection::manual(2);
        new.earnings = Some(f64::NAN);
        new.co2_saved = Some(f64::INFINITY);

        let record = RewardCalculator::create_record(new, Uuid::new_v4(), 0);

        assert!(approx_eq(record.earnings, 0.1));
        assert!(approx_eq(record.co2_saved, 0.2));
    }

    #[test]
    fn test_defaults_for_missing_description() {
        let record = RewardCalculator::create_record(NewDetection::manual(1), Uuid::new_v4(), 0);

        assert_eq!(record.size, "330 ml");
        assert_eq!(record.color, "clear");
        assert_eq!(record.material, "PET");
    }

    #[test]
    fn test_manual_entries_always_full_confidence() {
        let mut new = NewDetection::manual(1);
        new.confidence = Some(42);

        let record = RewardCalculator::create_record(new, Uuid::new_v4(), 0);
        assert_eq!(record.confidence, 100);
    }

    #[test]
    fn test_scan_confidence_clamped() {
        let record =
            RewardCalculator::create_record(NewDetection::scanned(1, 250), Uuid::new_v4(), 0);
        assert_eq!(record.confidence, 100);
    }

    #[test]
    fn test_rewards_exact_for_huge_counts() {
        let record =
            RewardCalculator::create_record(NewDetection::manual(u32::MAX), Uuid::new_v4(), 0);

        assert_eq!(record.points, u32::MAX as u64 * 5);
        assert_eq!(record.poly_money, u32::MAX as u64 * 5);
    }

    #[test]
    fn test_zero_bottles_raised_to_one() {
        let record = RewardCalculator::create_record(NewDetection::manual(0), Uuid::new_v4(), 0);

        assert_eq!(record.bottles, 1);
        assert_eq!(record.points, 5);
    }
}
