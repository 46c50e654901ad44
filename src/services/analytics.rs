// src/services/analytics.rs

use std::collections::HashMap;

use chrono::Duration;

use crate::{
    error::AppError,
    models::analytics::{AccuracyPoint, OverviewResponse, TopicMasteryStat},
    services::{
        percent,
        trend::{self, TREND_DAYS},
    },
    store::Store,
    utils::clock::Clock,
};

/// Headline numbers for the dashboard.
pub async fn overview(
    store: &dyn Store,
    user_id: i64,
    clock: &dyn Clock,
) -> Result<OverviewResponse, AppError> {
    let attempts = store.attempts_for_user(user_id, None).await?;
    let total = attempts.len() as i64;
    let correct = attempts.iter().filter(|a| a.correct).count() as i64;

    Ok(OverviewResponse {
        accuracy: format!("{}%", percent(correct, total)),
        study_streak: format!("{} days", trend::study_streak(&attempts, clock)),
        hours_studied: trend::hours_studied(&attempts),
        total_questions: total.to_string(),
    })
}

/// Ten daily accuracy points ending today.
pub async fn accuracy_trend(
    store: &dyn Store,
    user_id: i64,
    clock: &dyn Clock,
) -> Result<Vec<AccuracyPoint>, AppError> {
    // Superset of the window; bucketing trims it to whole local days.
    let since = clock.now_utc() - Duration::days(TREND_DAYS + 1);
    let attempts = store.attempts_for_user(user_id, Some(since)).await?;
    Ok(trend::accuracy_trend(&attempts, clock))
}

/// Every topic the user has a mastery row for.
pub async fn topic_mastery(store: &dyn Store, user_id: i64) -> Result<Vec<TopicMasteryStat>, AppError> {
    let names: HashMap<i64, String> = store
        .list_topics()
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let stats = store
        .list_mastery(user_id)
        .await?
        .into_iter()
        .map(|row| TopicMasteryStat {
            topic_id: row.topic_id,
            name: names.get(&row.topic_id).cloned().unwrap_or_default(),
            mastery_pct: row.mastery_pct,
            weak: row.weak,
        })
        .collect();

    Ok(stats)
}
