use eco_types::{EnvironmentalImpact, Milestone, Milestones, Rank, RankProgress, UserStats};

const TREES_PER_KG_CO2: f64 = 2.5;
const CAR_MILES_PER_KG_CO2: f64 = 2.2;
const KWH_PER_KG_CO2: f64 = 1.5;
const OCEAN_WASTE_PER_BOTTLE: f64 = 0.8;
const LANDFILL_PER_BOTTLE: f64 = 0.3;

pub const BOTTLE_MILESTONE_STEP: f64 = 50.0;
pub const CO2_MILESTONE_STEP: f64 = 5.0;
pub const POINTS_MILESTONE_STEP: f64 = 100.0;

pub fn environmental_impact(stats: &UserStats) -> EnvironmentalImpact {
    let co2 = stats.total_co2_saved;
    let bottles = stats.total_bottles as f64;

    EnvironmentalImpact {
        co2_saved_kg: co2,
        trees_planted: rounded(co2 * TREES_PER_KG_CO2),
        car_miles_saved: rounded(co2 * CAR_MILES_PER_KG_CO2),
        electricity_saved_kwh: rounded(co2 * KWH_PER_KG_CO2),
        ocean_waste_prevented: rounded(bottles * OCEAN_WASTE_PER_BOTTLE),
        landfill_space_saved: rounded(bottles * LANDFILL_PER_BOTTLE),
    }
}

fn rounded(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// Next milestone strictly above `current`, on a fixed step.
pub fn milestone(current: f64, step: f64) -> Milestone {
    let completed = (current / step).floor();
    Milestone {
        current,
        next: (completed + 1.0) * step,
        progress: (current - completed * step) / step,
    }
}

pub fn milestones(stats: &UserStats) -> Milestones {
    Milestones {
        bottles: milestone(stats.total_bottles as f64, BOTTLE_MILESTONE_STEP),
        co2: milestone(stats.total_co2_saved, CO2_MILESTONE_STEP),
        points: milestone(stats.total_points as f64, POINTS_MILESTONE_STEP),
    }
}

/// Highest rank whose threshold `bottles` has reached.
pub fn rank_for(bottles: u64) -> Rank {
    Rank::ALL
        .into_iter()
        .rev()
        .find(|r| bottles >= r.threshold())
        .unwrap_or(Rank::EcoStarter)
}

pub fn rank(stats: &UserStats) -> RankProgress {
    let bottles = stats.total_bottles;
    let current = rank_for(bottles);

    match current.next() {
        Some(next) => {
            let floor = current.threshold();
            let span = (next.threshold() - floor) as f64;
            RankProgress {
                rank: current,
                next_rank: Some(next),
                next_threshold: Some(next.threshold()),
                progress: (bottles - floor) as f64 / span,
            }
        }
        None => RankProgress {
            rank: current,
            next_rank: None,
            next_threshold: None,
            progress: 1.0,
        },
    }
}
