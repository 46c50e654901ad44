// src/handlers/analytics.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    services::{analytics, readiness},
    state::AppState,
    utils::jwt::Claims,
};

pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let overview =
        analytics::overview(state.store.as_ref(), claims.user_id()?, state.clock.as_ref()).await?;
    Ok(Json(overview))
}

pub async fn topic_mastery(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let stats = analytics::topic_mastery(state.store.as_ref(), claims.user_id()?).await?;
    Ok(Json(stats))
}

/// Weighted readiness score with its four components.
pub async fn readiness(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let report =
        readiness::compute_readiness(state.store.as_ref(), claims.user_id()?, state.clock.as_ref()).await?;
    Ok(Json(report))
}

pub async fn accuracy_trend(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let points =
        analytics::accuracy_trend(state.store.as_ref(), claims.user_id()?, state.clock.as_ref()).await?;
    Ok(Json(points))
}
