// src/services/practice.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    config::LessonCatalog,
    error::AppError,
    models::{
        practice::{
            AnswerAttemptRequest, Attempt, AttemptResultResponse, CreatePracticeSessionRequest,
            MistakeQuestion, NewAttempt, PracticeSession,
        },
        question::Question,
        topic::Topic,
    },
    services::mastery::recompute_mastery,
    store::Store,
};

const MISTAKE_TOPIC_NAME: &str = "Mistake Review";
const MISTAKE_TOPIC_SLUG: &str = "mistake-review";
const MISTAKE_TOPIC_COLOR: &str = "gray";

pub async fn start_session(
    store: &dyn Store,
    user_id: i64,
    req: &CreatePracticeSessionRequest,
    now: DateTime<Utc>,
) -> Result<PracticeSession, AppError> {
    req.validate()?;
    store
        .find_topic(req.topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let difficulty = req
        .difficulty
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let session = store
        .create_practice_session(user_id, req.topic_id, difficulty, req.question_count, now)
        .await?;

    tracing::info!(user_id, session_id = session.id, topic_id = req.topic_id, "Started practice session");
    Ok(session)
}

/// Grades one answer, stores it, and refreshes mastery for the question's topic.
pub async fn record_attempt(
    store: &dyn Store,
    catalog: &LessonCatalog,
    user_id: i64,
    req: &AnswerAttemptRequest,
    now: DateTime<Utc>,
) -> Result<AttemptResultResponse, AppError> {
    req.validate()?;

    let session = store.find_practice_session(req.session_id).await?;
    if !session.is_some_and(|s| s.user_id == user_id) {
        return Err(AppError::not_found("Session"));
    }
    let question = match store.find_question(req.question_id).await? {
        Some(q) if q.owner_id == user_id => q,
        _ => return Err(AppError::not_found("Question")),
    };

    let correct = question.is_correct(req.selected_answer_index);
    let attempt = store
        .insert_attempt(NewAttempt {
            user_id,
            question_id: question.id,
            topic_id: question.topic_id,
            practice_session_id: req.session_id,
            selected_answer_index: req.selected_answer_index,
            correct,
            time_taken_seconds: req.time_taken_seconds,
            created_at: now,
        })
        .await?;

    let mastery_pct = recompute_mastery(store, catalog, user_id, question.topic_id).await?;

    Ok(AttemptResultResponse {
        attempt_id: attempt.id,
        correct,
        correct_answer_index: question.correct_answer_index,
        mastery_pct,
    })
}

/// Latest wrong attempt per question, newest first.
async fn latest_mistakes(
    store: &dyn Store,
    user_id: i64,
    topic_id: Option<i64>,
) -> Result<Vec<Attempt>, AppError> {
    let wrong = store.incorrect_attempts(user_id, topic_id).await?;
    let mut seen = HashSet::new();
    Ok(wrong
        .into_iter()
        .filter(|a| seen.insert(a.question_id))
        .collect())
}

/// Questions the user has answered wrong, most recent mistake first, one entry each.
pub async fn mistakes(
    store: &dyn Store,
    user_id: i64,
    topic_id: Option<i64>,
) -> Result<Vec<MistakeQuestion>, AppError> {
    let latest = latest_mistakes(store, user_id, topic_id).await?;

    let ids: Vec<i64> = latest.iter().map(|a| a.question_id).collect();
    let questions: HashMap<i64, Question> = store
        .find_questions(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();
    let topic_names: HashMap<i64, String> = store
        .list_topics()
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let items = latest
        .into_iter()
        .filter_map(|attempt| {
            let question = questions.get(&attempt.question_id)?;
            Some(MistakeQuestion {
                question_id: question.id,
                topic_id: question.topic_id,
                topic_name: topic_names
                    .get(&question.topic_id)
                    .cloned()
                    .unwrap_or_default(),
                text: question.text.clone(),
                user_answer: question.choice(attempt.selected_answer_index),
                correct_answer: question.choice(Some(question.correct_answer_index)),
                attempted_at: attempt.created_at,
            })
        })
        .collect();

    Ok(items)
}

/// The distinct questions behind [`mistakes`], in the same order.
pub async fn mistake_questions(
    store: &dyn Store,
    user_id: i64,
    topic_id: Option<i64>,
) -> Result<Vec<Question>, AppError> {
    let ids: Vec<i64> = latest_mistakes(store, user_id, topic_id)
        .await?
        .into_iter()
        .map(|a| a.question_id)
        .collect();

    let mut by_id: HashMap<i64, Question> = store
        .find_questions(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Opens a practice session sized to the caller's distinct mistakes in one topic.
pub async fn start_mistake_session(
    store: &dyn Store,
    user_id: i64,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<PracticeSession, AppError> {
    store
        .find_topic(topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let count = latest_mistakes(store, user_id, Some(topic_id)).await?.len() as i32;
    let session = store
        .create_practice_session(user_id, topic_id, None, count, now)
        .await?;

    tracing::info!(user_id, session_id = session.id, topic_id, count, "Started mistake review session");
    Ok(session)
}

/// Opens a practice session over every mistake, filed under the shared "Mistake Review" topic.
pub async fn start_mistake_session_all(
    store: &dyn Store,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<PracticeSession, AppError> {
    let topic = mistake_review_topic(store).await?;

    let count = latest_mistakes(store, user_id, None).await?.len() as i32;
    let session = store
        .create_practice_session(user_id, topic.id, None, count, now)
        .await?;

    tracing::info!(user_id, session_id = session.id, count, "Started mistake review session");
    Ok(session)
}

async fn mistake_review_topic(store: &dyn Store) -> Result<Topic, AppError> {
    if let Some(topic) = store.find_topic_by_slug(MISTAKE_TOPIC_SLUG).await? {
        return Ok(topic);
    }
    match store
        .create_topic(MISTAKE_TOPIC_NAME, MISTAKE_TOPIC_SLUG, MISTAKE_TOPIC_COLOR)
        .await
    {
        Ok(topic) => Ok(topic),
        // Lost a race with another request creating it.
        Err(AppError::Conflict(_)) => store
            .find_topic_by_slug(MISTAKE_TOPIC_SLUG)
            .await?
            .ok_or_else(|| AppError::not_found("Topic")),
        Err(e) => Err(e),
    }
}
