use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::{require_role, AuthUser};
use crate::api::dtos::requests::{AssignTicketRequest, CreateTicketRequest, UpdateTicketRequest};
use crate::api::dtos::responses::{ServiceSummary, TicketResponse, UserSummary};
use crate::domain::models::ticket::{
    Ticket, PRIORITY_MEDIUM, STATUS_IN_PROGRESS, STATUS_OPEN, VALID_PRIORITIES, VALID_STATUSES,
};
use crate::domain::models::user::{ROLE_ADMIN, ROLE_SUPPORT};
use std::sync::Arc;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let priority = payload.priority.unwrap_or_else(|| PRIORITY_MEDIUM.to_string());
    if !VALID_PRIORITIES.contains(&priority.as_str()) {
        return Err(AppError::Validation("Invalid priority value".into()));
    }

    let service = state.service_repo.find_by_id(&payload.service_id).await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

    let ticket = Ticket::new(payload.title, payload.description, priority, user.id.clone(), service.id.clone());
    let created = state.ticket_repo.create(&ticket).await?;

    info!("Ticket {} created by {}", created.id, user.id);

    let response = to_ticket_response(&state, created).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": response }))))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tickets = state.ticket_repo.list().await?;

    let mut data = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        data.push(to_ticket_response(&state, ticket).await?);
    }

    Ok(Json(json!({ "data": data })))
}

pub async fn staff_tickets(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_SUPPORT])?;

    let tickets = state.ticket_repo.list_by_assignee(&user.id).await?;

    let mut data = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        data.push(to_ticket_response(&state, ticket).await?);
    }

    Ok(Json(json!({ "data": data })))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = state.ticket_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    let response = to_ticket_response(&state, ticket).await?;
    Ok(Json(json!({ "data": response })))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN, ROLE_SUPPORT])?;

    let mut ticket = state.ticket_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    if let Some(status) = &payload.status {
        if !VALID_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation("Invalid status value".into()));
        }
        ticket.status = status.clone();
    }

    if let Some(priority) = &payload.priority {
        if !VALID_PRIORITIES.contains(&priority.as_str()) {
            return Err(AppError::Validation("Invalid priority value".into()));
        }
        ticket.priority = priority.clone();
    }

    if let Some(title) = payload.title {
        ticket.title = title;
    }

    if let Some(description) = payload.description {
        ticket.description = description;
    }

    if let Some(assignment) = payload.assigned_to {
        match assignment {
            None => ticket.assigned_to_id = None,
            Some(user_id) => {
                let assignee = state.user_repo.find_by_id(&user_id).await?
                    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

                if assignee.role != ROLE_SUPPORT {
                    return Err(AppError::Validation("Only support staff can be assigned tickets".into()));
                }

                ticket.assigned_to_id = Some(assignee.id);
            }
        }
    }

    ticket.updated_at = Utc::now();
    let updated = state.ticket_repo.update(&ticket).await?;

    info!("Ticket {} updated by {}", updated.id, user.id);

    let response = to_ticket_response(&state, updated).await?;
    Ok(Json(json!({
        "message": "Ticket updated successfully",
        "data": response
    })))
}

pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<AssignTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, &[ROLE_ADMIN])?;

    let mut ticket = state.ticket_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    let previous_assignee = ticket.assigned_to_id.clone();
    let mut new_assignee = None;

    match payload.user_id {
        Some(user_id) => {
            let staff = state.user_repo.find_by_id(&user_id).await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;

            if staff.role != ROLE_SUPPORT {
                return Err(AppError::Validation("Only support staff can be assigned tickets".into()));
            }

            ticket.assigned_to_id = Some(staff.id.clone());
            ticket.status = STATUS_IN_PROGRESS.to_string();
            new_assignee = Some(staff);
        }
        None => {
            ticket.assigned_to_id = None;
            ticket.status = STATUS_OPEN.to_string();
        }
    }

    ticket.updated_at = Utc::now();
    let updated = state.ticket_repo.update(&ticket).await?;

    // Notify only on an actual change of assignee, not on re-assignment of
    // the same person.
    if let Some(staff) = &new_assignee {
        if previous_assignee.as_deref() != Some(staff.id.as_str()) {
            let client_name = state.user_repo.find_by_id(&updated.client_id).await?
                .map(|c| c.name)
                .unwrap_or_else(|| "Unknown Client".to_string());

            if let Err(e) = state.notifier.send_assignment_email(&staff.email, &staff.name, &updated, &client_name).await {
                error!("Failed to send assignment email to {}: {:?}", staff.email, e);
            } else {
                info!("Assignment notification sent to {}", staff.email);
            }
        }
    }

    info!("Ticket {} assignment changed by {}", updated.id, user.id);

    let email_sent = new_assignee.is_some();
    let response = to_ticket_response(&state, updated).await?;
    Ok(Json(json!({
        "message": "Ticket assigned successfully",
        "data": response,
        "emailSent": email_sent
    })))
}

async fn to_ticket_response(state: &AppState, ticket: Ticket) -> Result<TicketResponse, AppError> {
    let client = state.user_repo.find_by_id(&ticket.client_id).await?;

    let assigned_to = match &ticket.assigned_to_id {
        Some(id) => state.user_repo.find_by_id(id).await?,
        None => None,
    };

    let service = state.service_repo.find_by_id(&ticket.service_id).await?;

    Ok(TicketResponse {
        id: ticket.id,
        title: ticket.title,
        description: ticket.description,
        status: ticket.status,
        priority: ticket.priority,
        client: client.as_ref().map(UserSummary::from),
        assigned_to: assigned_to.as_ref().map(UserSummary::from),
        service: service.as_ref().map(ServiceSummary::from),
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    })
}
