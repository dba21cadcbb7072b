//! Read-side views over a ledger.
//!
//! Everything here is a pure function of the records and an explicit `now`,
//! so callers choose the time zone that defines a calendar day. The ledger
//! store passes local wall-clock time.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone};
use eco_types::{
    BestScan, DetectionRecord, EpochMillis, PeriodTotals, Redemption, UserStats, WeeklyStats,
};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
pub const WEEK_MILLIS: i64 = 7 * DAY_MILLIS;
pub const MONTH_MILLIS: i64 = 30 * DAY_MILLIS;

/// Calendar date of an epoch timestamp as seen in `tz`.
pub fn local_date<Tz: TimeZone>(timestamp: EpochMillis, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Records created between local midnight and `now`, in ledger order.
pub fn today_scans<Tz: TimeZone>(
    records: &[DetectionRecord],
    now: &DateTime<Tz>,
) -> Vec<DetectionRecord> {
    let tz = now.timezone();
    let today = now.date_naive();
    let now_ms = now.timestamp_millis();

    records
        .iter()
        .filter(|r| r.timestamp <= now_ms && local_date(r.timestamp, &tz) == Some(today))
        .cloned()
        .collect()
}

/// Sum the reward fields of records with timestamps in `[start, end]`.
pub fn period_totals(records: &[DetectionRecord], start: EpochMillis, end: EpochMillis) -> PeriodTotals {
    records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= end)
        .fold(PeriodTotals::default(), |mut acc, r| {
            acc.bottles += r.bottles as u64;
            acc.points += r.points;
            acc.poly_money += r.poly_money;
            acc.earnings += r.earnings;
            acc.co2_saved += r.co2_saved;
            acc
        })
}

pub fn weekly_stats<Tz: TimeZone>(records: &[DetectionRecord], now: &DateTime<Tz>) -> WeeklyStats {
    let now_ms = now.timestamp_millis();

    WeeklyStats {
        totals: period_totals(records, now_ms - WEEK_MILLIS, now_ms),
        streak: current_streak(records, now),
        longest_streak: longest_streak(records, &now.timezone()),
    }
}

pub fn monthly_stats<Tz: TimeZone>(records: &[DetectionRecord], now: &DateTime<Tz>) -> PeriodTotals {
    let now_ms = now.timestamp_millis();
    period_totals(records, now_ms - MONTH_MILLIS, now_ms)
}

/// Most recent `limit` records, newest first. Records sharing a timestamp
/// come out in reverse insertion order.
pub fn recent_scans(records: &[DetectionRecord], limit: usize) -> Vec<DetectionRecord> {
    let mut sorted: Vec<DetectionRecord> = records.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

fn active_days<Tz: TimeZone>(records: &[DetectionRecord], tz: &Tz) -> BTreeSet<NaiveDate> {
    records
        .iter()
        .filter_map(|r| local_date(r.timestamp, tz))
        .collect()
}

/// Consecutive calendar days, ending today, that have at least one record.
/// Zero when nothing was logged today.
pub fn current_streak<Tz: TimeZone>(records: &[DetectionRecord], now: &DateTime<Tz>) -> u32 {
    let now_ms = now.timestamp_millis();
    let past: Vec<DetectionRecord> = records
        .iter()
        .filter(|r| r.timestamp <= now_ms)
        .cloned()
        .collect();
    let days = active_days(&past, &now.timezone());

    let mut streak = 0;
    let mut day = Some(now.date_naive());
    while let Some(d) = day {
        if !days.contains(&d) {
            break;
        }
        streak += 1;
        day = d.pred_opt();
    }
    streak
}

/// Longest run of consecutive active days anywhere in the ledger.
pub fn longest_streak<Tz: TimeZone>(records: &[DetectionRecord], tz: &Tz) -> u32 {
    let days = active_days(records, tz);

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(expected) if expected == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

pub fn user_stats(records: &[DetectionRecord], redemptions: &[Redemption]) -> UserStats {
    let mut stats = UserStats::default();
    let mut confidence_sum = 0.0;

    for record in records {
        stats.total_bottles += record.bottles as u64;
        stats.total_points += record.points;
        stats.total_poly_money += record.poly_money;
        stats.total_earnings += record.earnings;
        stats.total_co2_saved += record.co2_saved;
        stats.total_scans += 1;
        confidence_sum += record.confidence as f64;

        let is_best = stats
            .best_scan
            .as_ref()
            .is_none_or(|best| record.bottles > best.bottles);
        if is_best {
            stats.best_scan = Some(BestScan {
                bottles: record.bottles,
                timestamp: record.timestamp,
                confidence: record.confidence,
            });
        }

        stats.last_scan_at = Some(
            stats
                .last_scan_at
                .map_or(record.timestamp, |last| last.max(record.timestamp)),
        );
    }

    if stats.total_scans > 0 {
        stats.average_confidence = confidence_sum / stats.total_scans as f64;
    }

    stats.redeemed_points = redemptions.iter().map(|r| r.cost).sum();
    stats.points_balance = stats.total_points.saturating_sub(stats.redeemed_points);
    stats
}
