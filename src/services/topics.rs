// src/services/topics.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::{
    error::AppError,
    models::topic::{CreateTopicRequest, Topic, TopicMastery, TopicResponse},
    store::Store,
};

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9\s-]").unwrap_or_else(|e| panic!("invalid slug pattern: {}", e))
});

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s-]+").unwrap_or_else(|e| panic!("invalid slug pattern: {}", e))
});

const DEFAULT_COLOR: &str = "blue";
const FALLBACK_SLUG: &str = "topic";

/// Lowercase ASCII alphanumerics joined by single dashes; "topic" when nothing survives.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept = DISALLOWED.replace_all(&lowered, "");
    let slug = SEPARATORS.replace_all(kept.trim(), "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// All topics with the caller's weak flag and mastery (0 if never computed).
pub async fn list_topics(store: &dyn Store, user_id: i64) -> Result<Vec<TopicResponse>, AppError> {
    let mastery: HashMap<i64, TopicMastery> = store
        .list_mastery(user_id)
        .await?
        .into_iter()
        .map(|m| (m.topic_id, m))
        .collect();

    Ok(store
        .list_topics()
        .await?
        .into_iter()
        .map(|t| {
            let row = mastery.get(&t.id);
            TopicResponse::new(t, row)
        })
        .collect())
}

/// Sets the weak flag, creating the mastery row at 0% when absent.
pub async fn set_weak(
    store: &dyn Store,
    user_id: i64,
    topic_id: i64,
    weak: bool,
) -> Result<TopicResponse, AppError> {
    let topic = store
        .find_topic(topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let row = match store.find_mastery(user_id, topic_id).await? {
        Some(mut row) => {
            row.weak = weak;
            store.update_mastery(&row).await?;
            row
        }
        None => {
            let row = TopicMastery {
                user_id,
                topic_id,
                mastery_pct: 0,
                weak,
            };
            store.insert_mastery(&row).await?;
            row
        }
    };

    Ok(TopicResponse::new(topic, Some(&row)))
}

/// Creates a topic with a unique slug derived from its name ("x", "x-2", "x-3", ...).
pub async fn create_topic(store: &dyn Store, req: &CreateTopicRequest) -> Result<Topic, AppError> {
    req.validate()?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Topic name is required".to_string()));
    }
    let base = slugify(name);

    let mut slug = base.clone();
    let mut suffix = 2;
    while store.find_topic_by_slug(&slug).await?.is_some() {
        slug = format!("{}-{}", base, suffix);
        suffix += 1;
    }

    let color = req
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COLOR);

    let topic = store.create_topic(name, &slug, color).await?;
    tracing::info!(topic_id = topic.id, slug = %topic.slug, "Created topic");
    Ok(topic)
}
