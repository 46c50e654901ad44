// src/services/readiness.rs

use chrono::Duration;

use crate::{
    error::AppError,
    models::{
        analytics::ReadinessReport, exam::ExamSession, practice::Attempt, topic::TopicMastery,
    },
    services::{blend, percent, trend::active_days},
    store::Store,
    utils::clock::Clock,
};

/// Trailing window, in days, for the consistency figure.
pub const CONSISTENCY_WINDOW_DAYS: i64 = 14;
/// A topic counts as covered from this mastery percentage up.
pub const COVERAGE_THRESHOLD: i32 = 50;

/// Share of the last 14 days with practice.
///
/// Attempts dated after `now` are ignored and the result is capped at 100:
/// a 14x24h window can touch 15 calendar days.
pub fn consistency(attempts: &[Attempt], clock: &dyn Clock) -> i32 {
    let now_utc = clock.now_utc();
    let window_start = now_utc - Duration::days(CONSISTENCY_WINDOW_DAYS);
    let in_window: Vec<Attempt> = attempts
        .iter()
        .filter(|a| a.created_at > window_start && a.created_at <= now_utc)
        .cloned()
        .collect();
    let days = active_days(&in_window, clock).len() as i64;
    percent(days, CONSISTENCY_WINDOW_DAYS).min(100)
}

/// Share of topics with any mastery row that reached `COVERAGE_THRESHOLD`.
pub fn coverage(rows: &[TopicMastery]) -> i32 {
    let covered = rows
        .iter()
        .filter(|r| r.mastery_pct >= COVERAGE_THRESHOLD)
        .count() as i64;
    percent(covered, rows.len() as i64)
}

/// Rounded mean of submitted exam scores; 0 when none are scored.
pub fn mock_exam_average(sessions: &[ExamSession]) -> i32 {
    let scores: Vec<i64> = sessions
        .iter()
        .filter_map(|s| s.score)
        .map(i64::from)
        .collect();
    // mean of percentages == percent(sum, count * 100)
    percent(scores.iter().sum(), scores.len() as i64 * 100)
}

/// 50% accuracy, 20% consistency, 20% coverage, 10% mock exams.
pub fn readiness_score(accuracy: i32, consistency: i32, coverage: i32, mock_exam_avg: i32) -> i32 {
    blend(&[
        (accuracy, 5),
        (consistency, 2),
        (coverage, 2),
        (mock_exam_avg, 1),
    ])
}

/// Read-only snapshot of a user's exam readiness.
pub async fn compute_readiness(
    store: &dyn Store,
    user_id: i64,
    clock: &dyn Clock,
) -> Result<ReadinessReport, AppError> {
    let counts = store.attempt_counts(user_id, None).await?;
    let accuracy = percent(counts.correct, counts.total);

    let since = clock.now_utc() - Duration::days(CONSISTENCY_WINDOW_DAYS);
    let recent = store.attempts_for_user(user_id, Some(since)).await?;
    let consistency = consistency(&recent, clock);

    let mastery_rows = store.list_mastery(user_id).await?;
    let coverage = coverage(&mastery_rows);

    let sessions = store.exam_sessions_for_user(user_id).await?;
    let mock_exam_avg = mock_exam_average(&sessions);

    Ok(ReadinessReport {
        score: readiness_score(accuracy, consistency, coverage, mock_exam_avg),
        accuracy,
        consistency,
        coverage,
        mock_exam_avg,
    })
}
