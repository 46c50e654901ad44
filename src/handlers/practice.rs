// src/handlers/practice.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::practice::{
        AnswerAttemptRequest, CreatePracticeSessionRequest, MistakeParams, MistakeTopicParams,
    },
    services::practice,
    state::AppState,
    utils::jwt::Claims,
};

pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePracticeSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = practice::start_session(
        state.store.as_ref(),
        claims.user_id()?,
        &payload,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Grades a practice answer and returns the updated topic mastery.
pub async fn record_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AnswerAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = practice::record_attempt(
        state.store.as_ref(),
        &state.catalog,
        claims.user_id()?,
        &payload,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn list_mistakes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<MistakeParams>,
) -> Result<impl IntoResponse, AppError> {
    let list = practice::mistakes(state.store.as_ref(), claims.user_id()?, params.topic_id).await?;
    Ok(Json(list))
}

/// Distinct wrongly answered questions in one topic.
pub async fn mistake_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<MistakeTopicParams>,
) -> Result<impl IntoResponse, AppError> {
    let list =
        practice::mistake_questions(state.store.as_ref(), claims.user_id()?, Some(params.topic_id))
            .await?;
    Ok(Json(list))
}

pub async fn all_mistake_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let list = practice::mistake_questions(state.store.as_ref(), claims.user_id()?, None).await?;
    Ok(Json(list))
}

pub async fn start_mistake_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<MistakeTopicParams>,
) -> Result<impl IntoResponse, AppError> {
    let session = practice::start_mistake_session(
        state.store.as_ref(),
        claims.user_id()?,
        params.topic_id,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn start_all_mistakes_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = practice::start_mistake_session_all(
        state.store.as_ref(),
        claims.user_id()?,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}
