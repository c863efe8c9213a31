//! Adherence statistics over a trailing window.
//!
//! The engine is a pure fold over per-date tallies: it never touches the
//! store, so the same tallies always produce the same report.

use crate::DailyTally;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scheduled doses per day; a date is complete at this many TAKEN events
pub const DOSES_PER_DAY: i64 = 3;

/// Default trailing window in days
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// Headline numbers for the window
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdherenceSummary {
    pub total_doses: i64,
    pub doses_taken: i64,
    pub doses_missed: i64,
    pub adherence_percentage: f64,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// TAKEN and MISSED counts for one date
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DayBreakdown {
    pub taken: i64,
    pub missed: i64,
}

/// Full statistics report for one window
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdherenceReport {
    pub period_days: i64,
    pub statistics: AdherenceSummary,
    pub daily_breakdown: BTreeMap<NaiveDate, DayBreakdown>,
}

/// Streak lengths found in one scan
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub best: u32,
}

/// Percentage of `taken` over `total`, rounded half to even at two
/// decimals; 0 when empty
pub fn adherence_percentage(taken: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = taken as f64 / total as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

/// Scan tallies (any order) most recent date first
///
/// `current` is the run of complete dates counted back from the most recent
/// date present; `best` is the longest run anywhere. Dates with no events
/// are not present in the tallies, so a day without logging does not break
/// a run.
pub fn compute_streaks(tallies: &[DailyTally]) -> Streaks {
    let mut ordered: Vec<&DailyTally> = tallies.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let mut streaks = Streaks::default();
    let mut running = 0u32;
    let mut leading_run_open = true;

    for tally in ordered {
        if tally.taken >= DOSES_PER_DAY {
            running += 1;
            streaks.best = streaks.best.max(running);
            if leading_run_open {
                streaks.current = running;
            }
        } else {
            running = 0;
            leading_run_open = false;
        }
    }

    streaks
}

/// Fold per-date tallies into the full report
pub fn compute_statistics(period_days: i64, tallies: &[DailyTally]) -> AdherenceReport {
    let mut total = 0;
    let mut taken = 0;
    let mut missed = 0;
    let mut daily_breakdown = BTreeMap::new();

    for tally in tallies {
        total += tally.total;
        taken += tally.taken;
        missed += tally.missed;
        daily_breakdown.insert(
            tally.date,
            DayBreakdown {
                taken: tally.taken,
                missed: tally.missed,
            },
        );
    }

    let streaks = compute_streaks(tallies);

    AdherenceReport {
        period_days,
        statistics: AdherenceSummary {
            total_doses: total,
            doses_taken: taken,
            doses_missed: missed,
            adherence_percentage: adherence_percentage(taken, total),
            current_streak: streaks.current,
            best_streak: streaks.best,
        },
        daily_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() + chrono::Duration::days(offset)
    }

    fn tally(offset: i64, taken: i64, missed: i64) -> DailyTally {
        DailyTally {
            date: day(offset),
            total: taken + missed,
            taken,
            missed,
        }
    }

    #[test]
    fn test_empty_window() {
        let report = compute_statistics(30, &[]);
        assert_eq!(report.period_days, 30);
        assert_eq!(report.statistics.total_doses, 0);
        assert_eq!(report.statistics.adherence_percentage, 0.0);
        assert_eq!(report.statistics.current_streak, 0);
        assert_eq!(report.statistics.best_streak, 0);
        assert!(report.daily_breakdown.is_empty());
    }

    #[test]
    fn test_incomplete_today_after_two_complete_days() {
        let tallies = vec![tally(0, 1, 2), tally(-1, 3, 0), tally(-2, 3, 0)];
        let report = compute_statistics(30, &tallies);

        assert_eq!(report.statistics.total_doses, 9);
        assert_eq!(report.statistics.doses_taken, 7);
        assert_eq!(report.statistics.doses_missed, 2);
        assert_eq!(report.statistics.adherence_percentage, 77.78);
        assert_eq!(report.statistics.current_streak, 0);
        assert_eq!(report.statistics.best_streak, 2);
    }

    #[test]
    fn test_incomplete_today_after_three_complete_days() {
        let tallies = vec![tally(0, 1, 0), tally(-1, 3, 0), tally(-2, 3, 0), tally(-3, 3, 0)];
        let streaks = compute_streaks(&tallies);
        assert_eq!(streaks, Streaks { current: 0, best: 3 });
    }

    #[test]
    fn test_current_streak_counts_back_from_latest_date() {
        // Complete, complete, broken, then an older longer run
        let tallies = vec![
            tally(0, 3, 0),
            tally(-1, 4, 0),
            tally(-2, 2, 1),
            tally(-3, 3, 0),
            tally(-4, 3, 0),
            tally(-5, 3, 0),
        ];
        let streaks = compute_streaks(&tallies);
        assert_eq!(streaks, Streaks { current: 2, best: 3 });
    }

    #[test]
    fn test_unsorted_input_is_scanned_newest_first() {
        let tallies = vec![tally(-2, 3, 0), tally(0, 0, 3), tally(-1, 3, 0)];
        let streaks = compute_streaks(&tallies);
        assert_eq!(streaks, Streaks { current: 0, best: 2 });
    }

    #[test]
    fn test_missing_dates_do_not_break_streak() {
        // Nothing logged on day -1 or -2
        let tallies = vec![tally(0, 3, 0), tally(-3, 3, 0)];
        let streaks = compute_streaks(&tallies);
        assert_eq!(streaks, Streaks { current: 2, best: 2 });
    }

    #[test]
    fn test_unknown_event_types_count_in_total_only() {
        let tallies = vec![DailyTally {
            date: day(0),
            total: 4,
            taken: 3,
            missed: 0,
        }];
        let report = compute_statistics(7, &tallies);
        assert_eq!(report.statistics.total_doses, 4);
        assert_eq!(report.statistics.adherence_percentage, 75.0);
        assert_eq!(report.statistics.current_streak, 1);
    }

    #[test]
    fn test_adherence_rounding() {
        assert_eq!(adherence_percentage(1, 3), 33.33);
        assert_eq!(adherence_percentage(2, 3), 66.67);
        assert_eq!(adherence_percentage(3, 3), 100.0);
        assert_eq!(adherence_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_adherence_rounds_exact_ties_to_even() {
        // 1/32, 5/32 and 3/96 are exact binary ties at the third decimal
        assert_eq!(adherence_percentage(1, 32), 3.12);
        assert_eq!(adherence_percentage(5, 32), 15.62);
        assert_eq!(adherence_percentage(3, 96), 3.12);
    }

    #[test]
    fn test_breakdown_serializes_dates_as_keys() {
        let report = compute_statistics(30, &[tally(0, 2, 1)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["daily_breakdown"]["2024-06-15"]["taken"], 2);
        assert_eq!(json["daily_breakdown"]["2024-06-15"]["missed"], 1);
        assert_eq!(json["statistics"]["adherence_percentage"], 66.67);
    }
}
