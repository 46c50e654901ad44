// src/services/trend.rs

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::{
    models::{analytics::AccuracyPoint, practice::Attempt},
    services::percent,
    utils::clock::Clock,
};

/// Days covered by the accuracy trend, today included.
pub const TREND_DAYS: i64 = 10;

/// Distinct local calendar days with at least one attempt.
pub fn active_days(attempts: &[Attempt], clock: &dyn Clock) -> HashSet<NaiveDate> {
    attempts.iter().map(|a| clock.day_of(a.created_at)).collect()
}

/// Daily accuracy for [today - 9, today], oldest first. Always `TREND_DAYS` points.
pub fn accuracy_trend(attempts: &[Attempt], clock: &dyn Clock) -> Vec<AccuracyPoint> {
    let today = clock.today();
    let start = today - Duration::days(TREND_DAYS - 1);

    let mut by_day: HashMap<NaiveDate, (i64, i64)> = HashMap::new();
    for attempt in attempts {
        let day = clock.day_of(attempt.created_at);
        if day < start || day > today {
            continue;
        }
        let entry = by_day.entry(day).or_default();
        entry.0 += 1;
        if attempt.correct {
            entry.1 += 1;
        }
    }

    (0..TREND_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let (total, correct) = by_day.get(&date).copied().unwrap_or((0, 0));
            AccuracyPoint {
                label: date.format("%b %-d").to_string(),
                date,
                accuracy: percent(correct, total),
                total: total as i32,
                correct: correct as i32,
            }
        })
        .collect()
}

/// Consecutive active days ending today. Zero when today has no attempt.
pub fn study_streak(attempts: &[Attempt], clock: &dyn Clock) -> i32 {
    let days = active_days(attempts, clock);
    let mut cursor = clock.today();
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Sum of positive `time_taken_seconds`, as hours with one decimal ("1.5h"), or "0h".
pub fn hours_studied(attempts: &[Attempt]) -> String {
    let seconds: i64 = attempts
        .iter()
        .filter_map(|a| a.time_taken_seconds)
        .filter(|&s| s > 0)
        .map(i64::from)
        .sum();
    if seconds == 0 {
        return "0h".to_string();
    }
    format!("{:.1}h", seconds as f64 / 3600.0)
}
