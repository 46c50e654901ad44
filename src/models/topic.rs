// src/models/topic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'topics' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    /// URL-safe key, also used by the lesson catalog.
    pub slug: String,
    pub color: String,
}

/// Represents the 'user_topics' table: one row per (user, topic).
///
/// `mastery_pct` is always the most recently computed value; no history is kept.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct TopicMastery {
    pub user_id: i64,
    pub topic_id: i64,
    pub mastery_pct: i32,
    pub weak: bool,
}

/// Topic as seen by one user.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub weak: bool,
    pub mastery_pct: i32,
}

impl TopicResponse {
    pub fn new(topic: Topic, mastery: Option<&TopicMastery>) -> Self {
        Self {
            id: topic.id,
            name: topic.name,
            slug: topic.slug,
            color: topic.color,
            weak: mastery.is_some_and(|m| m.weak),
            mastery_pct: mastery.map_or(0, |m| m.mastery_pct),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeakToggleRequest {
    pub weak: bool,
}
