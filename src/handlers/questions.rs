// src/handlers/questions.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, QuestionListParams},
    services::questions,
    state::AppState,
    utils::jwt::Claims,
};

/// Creates a question in the caller's bank.
pub async fn create_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions::create(
        state.store.as_ref(),
        claims.user_id()?,
        payload,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists the caller's questions, optionally for one topic.
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let list = questions::list(state.store.as_ref(), claims.user_id()?, params.topic_id).await?;
    Ok(Json(list))
}

pub async fn get_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions::get(state.store.as_ref(), claims.user_id()?, id).await?;
    Ok(Json(question))
}
