use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::{require_role, AuthUser};
use crate::api::dtos::requests::UpdateUserRequest;
use crate::api::dtos::responses::UserResponse;
use crate::domain::models::user::{ROLE_ADMIN, VALID_ROLES};
use std::sync::Arc;
use chrono::Utc;
use serde_json::json;
use tracing::info;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN])?;

    let users = state.user_repo.list().await?;
    let safe_users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();

    Ok(Json(safe_users))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(&target)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN])?;

    let mut target = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Some(role) = &payload.role {
        if !VALID_ROLES.contains(&role.as_str()) {
            return Err(AppError::Validation("Invalid role value".into()));
        }
        target.role = role.clone();
    }

    if let Some(name) = payload.name {
        target.name = name;
    }

    if let Some(email) = payload.email {
        target.email = email;
    }

    if let Some(is_active) = payload.is_active {
        target.is_active = is_active;
    }

    target.updated_at = Utc::now();
    let updated = state.user_repo.update(&target).await?;

    info!("User {} updated by {}", updated.id, user.id);

    Ok(Json(UserResponse::from(&updated)))
}

pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN])?;

    if user.id == id {
        return Err(AppError::Conflict("Cannot deactivate yourself".into()));
    }

    let mut target = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    // Soft delete keeps ticket history intact.
    target.is_active = false;
    target.updated_at = Utc::now();
    state.user_repo.update(&target).await?;

    info!("User {} deactivated by {}", id, user.id);

    Ok(Json(json!({ "message": "User deactivated successfully" })))
}
