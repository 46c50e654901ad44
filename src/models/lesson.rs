// src/models/lesson.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'lesson_progress' table. Unique per (user_id, lesson_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct LessonCompletion {
    pub id: i64,
    pub user_id: i64,
    pub topic_slug: String,
    pub lesson_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Both fields are required; they are optional here so a missing one is a 400
/// with a useful message instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct LessonProgressRequest {
    pub topic_slug: Option<String>,
    pub lesson_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LessonProgressParams {
    pub topic_slug: Option<String>,
}
