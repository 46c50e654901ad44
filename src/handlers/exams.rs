// src/handlers/exams.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::exam::ExamAnswerRequest,
    services::exam,
    state::AppState,
    utils::jwt::Claims,
};

/// Lists the mock exam catalog.
pub async fn list_exams(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let exams = exam::list_exams(state.store.as_ref()).await?;
    Ok(Json(exams))
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = exam::start_session(
        state.store.as_ref(),
        claims.user_id()?,
        exam_id,
        state.clock.now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn session_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions =
        exam::session_questions(state.store.as_ref(), claims.user_id()?, session_id).await?;
    Ok(Json(questions))
}

/// Records or replaces one answer while the session is open.
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(payload): Json<ExamAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answer =
        exam::record_answer(state.store.as_ref(), claims.user_id()?, session_id, &payload).await?;
    Ok(Json(answer))
}

pub async fn list_flags(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let flags = exam::list_flags(state.store.as_ref(), claims.user_id()?, session_id).await?;
    Ok(Json(flags))
}

/// Scores the session. A second submit is a 409.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = exam::submit(
        state.store.as_ref(),
        claims.user_id()?,
        session_id,
        state.clock.now_utc(),
    )
    .await?;
    Ok(Json(result))
}

pub async fn results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = exam::results(state.store.as_ref(), claims.user_id()?, session_id).await?;
    Ok(Json(result))
}
