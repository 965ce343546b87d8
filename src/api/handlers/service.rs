use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::{require_role, AuthUser};
use crate::api::dtos::requests::CreateServiceRequest;
use crate::api::dtos::responses::ServiceSummary;
use crate::domain::models::service::Service;
use crate::domain::models::user::ROLE_ADMIN;
use std::sync::Arc;
use serde_json::json;
use tracing::info;

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list().await?;
    let data: Vec<ServiceSummary> = services.iter().map(ServiceSummary::from).collect();

    Ok(Json(json!({ "data": data })))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

    Ok(Json(json!({ "data": ServiceSummary::from(&service) })))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN])?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Service name is required".into()));
    }

    let service = Service::new(payload.name, payload.description);
    let created = state.service_repo.create(&service).await?;

    info!("Service {} created by {}", created.id, user.id);

    Ok((StatusCode::CREATED, Json(json!({ "data": ServiceSummary::from(&created) }))))
}
