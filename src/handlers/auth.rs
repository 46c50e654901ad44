// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest},
    services::accounts,
    state::AppState,
};

/// Registers a new user.
///
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = accounts::register(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = accounts::login(state.store.as_ref(), &state.config, &payload).await?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer"
    })))
}
