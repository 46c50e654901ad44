// src/handlers/topics.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::topic::{CreateTopicRequest, WeakToggleRequest},
    services::topics,
    state::AppState,
    utils::jwt::Claims,
};

/// Lists every topic with the caller's mastery and weak flag.
pub async fn list_topics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let list = topics::list_topics(state.store.as_ref(), claims.user_id()?).await?;
    Ok(Json(list))
}

pub async fn create_topic(
    State(state): State<AppState>,
    Json(payload): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = topics::create_topic(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

/// Marks or unmarks a topic as weak for the caller.
pub async fn set_weak(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<WeakToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = topics::set_weak(state.store.as_ref(), claims.user_id()?, id, payload.weak).await?;
    Ok(Json(topic))
}
