// src/services/lessons.rs

use chrono::{DateTime, Utc};

use crate::{
    config::LessonCatalog,
    error::AppError,
    models::lesson::{LessonCompletion, LessonProgressRequest},
    services::mastery::recompute_mastery,
    store::Store,
};

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{} is required", field))),
    }
}

/// Recomputes mastery for the topic behind `slug`, if such a topic exists.
async fn refresh_topic(
    store: &dyn Store,
    catalog: &LessonCatalog,
    user_id: i64,
    slug: &str,
) -> Result<(), AppError> {
    if let Some(topic) = store.find_topic_by_slug(slug).await? {
        recompute_mastery(store, catalog, user_id, topic.id).await?;
    }
    Ok(())
}

pub async fn list(
    store: &dyn Store,
    user_id: i64,
    topic_slug: Option<&str>,
) -> Result<Vec<LessonCompletion>, AppError> {
    let slug = topic_slug.map(str::trim).filter(|s| !s.is_empty());
    store.list_completions(user_id, slug).await
}

/// Idempotent: completing an already-completed lesson returns the existing record.
pub async fn mark_complete(
    store: &dyn Store,
    catalog: &LessonCatalog,
    user_id: i64,
    req: &LessonProgressRequest,
    now: DateTime<Utc>,
) -> Result<LessonCompletion, AppError> {
    let slug = required(req.topic_slug.as_deref(), "topic_slug")?;
    let lesson_id = required(req.lesson_id.as_deref(), "lesson_id")?;

    if let Some(existing) = store.find_completion(user_id, lesson_id).await? {
        return Ok(existing);
    }

    let completion = store
        .insert_completion(user_id, slug, lesson_id, now)
        .await?;
    refresh_topic(store, catalog, user_id, slug).await?;

    tracing::info!(user_id, topic_slug = slug, lesson_id, "Lesson completed");
    Ok(completion)
}

/// Removes a completion if present. Absent completions are not an error.
pub async fn undo(
    store: &dyn Store,
    catalog: &LessonCatalog,
    user_id: i64,
    lesson_id: &str,
) -> Result<(), AppError> {
    let lesson_id = required(Some(lesson_id), "lesson_id")?;

    if let Some(existing) = store.find_completion(user_id, lesson_id).await? {
        store.delete_completion(existing.id).await?;
        refresh_topic(store, catalog, user_id, &existing.topic_slug).await?;
        tracing::info!(user_id, lesson_id, "Lesson completion undone");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(matches!(required(None, "lesson_id"), Err(AppError::BadRequest(_))));
        assert!(matches!(required(Some("   "), "lesson_id"), Err(AppError::BadRequest(_))));
        assert_eq!(required(Some(" gp-1 "), "lesson_id").unwrap(), "gp-1");
    }
}
