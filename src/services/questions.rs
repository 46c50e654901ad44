// src/services/questions.rs

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, Question},
    store::Store,
    utils::html::{clean_html, clean_optional},
};

/// Validates, sanitizes, and stores a question owned by `owner_id`.
pub async fn create(
    store: &dyn Store,
    owner_id: i64,
    req: CreateQuestionRequest,
    now: DateTime<Utc>,
) -> Result<Question, AppError> {
    req.validate()?;

    let in_range = usize::try_from(req.correct_answer_index)
        .is_ok_and(|i| i < req.choices.len());
    if !in_range {
        return Err(AppError::BadRequest(
            "correct_answer_index is out of range".to_string(),
        ));
    }

    store
        .find_topic(req.topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let clean = CreateQuestionRequest {
        text: clean_html(&req.text),
        choices: req.choices.iter().map(|c| clean_html(c)).collect(),
        explanation: clean_optional(req.explanation.as_deref()),
        ..req
    };
    if clean.text.trim().is_empty() {
        return Err(AppError::BadRequest("Question text is empty".to_string()));
    }

    let question = store.create_question(owner_id, &clean, now).await?;
    tracing::info!(owner_id, question_id = question.id, topic_id = question.topic_id, "Created question");
    Ok(question)
}

pub async fn list(
    store: &dyn Store,
    owner_id: i64,
    topic_id: Option<i64>,
) -> Result<Vec<Question>, AppError> {
    store.list_questions(owner_id, topic_id).await
}

/// Another user's question is reported as missing.
pub async fn get(store: &dyn Store, owner_id: i64, id: i64) -> Result<Question, AppError> {
    match store.find_question(id).await? {
        Some(q) if q.owner_id == owner_id => Ok(q),
        _ => Err(AppError::not_found("Question")),
    }
}
