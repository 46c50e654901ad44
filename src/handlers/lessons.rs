// src/handlers/lessons.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::lesson::{LessonProgressParams, LessonProgressRequest},
    services::lessons,
    state::AppState,
    utils::jwt::Claims,
};

pub async fn list_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<LessonProgressParams>,
) -> Result<impl IntoResponse, AppError> {
    let list = lessons::list(
        state.store.as_ref(),
        claims.user_id()?,
        params.topic_slug.as_deref(),
    )
    .await?;
    Ok(Json(list))
}

/// Marks a lesson complete. Repeating the call returns the original record.
pub async fn mark_complete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<LessonProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let completion = lessons::mark_complete(
        state.store.as_ref(),
        &state.catalog,
        claims.user_id()?,
        &payload,
        state.clock.now_utc(),
    )
    .await?;
    Ok(Json(completion))
}

pub async fn undo_complete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    lessons::undo(state.store.as_ref(), &state.catalog, claims.user_id()?, &lesson_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
