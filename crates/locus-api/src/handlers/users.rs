//! User registration and login.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use locus_core::{NewUser, User, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /users
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.db.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .users
        .verify_password(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;
    Ok(Json(user))
}

/// GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {username} not found")))?;
    Ok(Json(user))
}
