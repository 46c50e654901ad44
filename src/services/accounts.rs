// src/services/accounts.rs

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, MeResponse, UpdateProfileRequest, User},
    store::Store,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user. The password is stored as an Argon2 hash.
pub async fn register(store: &dyn Store, req: &CreateUserRequest) -> Result<User, AppError> {
    req.validate()?;

    let username = req.username.trim();
    let hashed_password = hash_password(&req.password)?;
    let user = store.create_user(username, &hashed_password).await?;

    tracing::info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Checks credentials and signs a bearer token.
///
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(store: &dyn Store, config: &Config, req: &LoginRequest) -> Result<String, AppError> {
    req.validate()?;

    let user = store
        .find_user_by_username(req.username.trim())
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&req.password, &user.password)? {
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    sign_jwt(user.id, &user.username, &config.jwt_secret, config.jwt_expiration)
}

pub async fn me(store: &dyn Store, user_id: i64) -> Result<MeResponse, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    profile_with_counters(store, user).await
}

/// Applies a partial profile update; fields left out of the request are unchanged.
pub async fn update_profile(
    store: &dyn Store,
    user_id: i64,
    req: UpdateProfileRequest,
    now: DateTime<Utc>,
) -> Result<MeResponse, AppError> {
    req.validate()?;

    let changes = UpdateProfileRequest {
        full_name: req.full_name.map(|n| n.trim().to_string()),
        avatar_url: req.avatar_url.map(|u| u.trim().to_string()),
        ..req
    };
    let user = store
        .update_profile(user_id, &changes, now)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    tracing::info!(user_id, "Updated profile");
    profile_with_counters(store, user).await
}

async fn profile_with_counters(store: &dyn Store, user: User) -> Result<MeResponse, AppError> {
    let attempts = store.attempt_counts(user.id, None).await?;
    let exam_sessions = store.exam_sessions_for_user(user.id).await?;
    let lessons = store.list_completions(user.id, None).await?;

    Ok(MeResponse {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        target_exam_date: user.target_exam_date,
        daily_study_hours: user.daily_study_hours,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
        updated_at: user.updated_at,
        attempts_count: attempts.total,
        exam_sessions_count: exam_sessions.len() as i64,
        lessons_completed: lessons.len() as i64,
    })
}
