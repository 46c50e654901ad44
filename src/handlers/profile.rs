// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError, models::user::UpdateProfileRequest, services::accounts, state::AppState,
    utils::jwt::Claims,
};

/// Get current user's profile and study counters.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let me = accounts::me(state.store.as_ref(), claims.user_id()?).await?;
    Ok(Json(me))
}

/// Partially update the current user's profile.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let me = accounts::update_profile(
        state.store.as_ref(),
        claims.user_id()?,
        payload,
        state.clock.now_utc(),
    )
    .await?;
    Ok(Json(me))
}
