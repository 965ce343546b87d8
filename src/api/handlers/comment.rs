use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::CreateCommentRequest;
use crate::api::dtos::responses::{CommentResponse, UserSummary};
use crate::domain::models::comment::Comment;
use std::sync::Arc;
use tracing::info;

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.body.trim().is_empty() {
        return Err(AppError::Validation("Comment body must not be empty".into()));
    }

    let ticket = state.ticket_repo.find_by_id(&payload.ticket_id).await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    let comment = Comment::new(payload.body, user.id.clone(), ticket.id);
    let created = state.comment_repo.create(&comment).await?;

    info!("Comment {} added to ticket {} by {}", created.id, created.ticket_id, user.id);

    let response = CommentResponse {
        id: created.id,
        body: created.body,
        author: Some(UserSummary::from(&user)),
        ticket_id: created.ticket_id,
        created_at: created.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(ticket_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = state.ticket_repo.find_by_id(&ticket_id).await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    let comments = state.comment_repo.list_by_ticket(&ticket.id).await?;

    let mut data = Vec::with_capacity(comments.len());
    for comment in comments {
        let author = state.user_repo.find_by_id(&comment.author_id).await?;
        data.push(CommentResponse {
            id: comment.id,
            body: comment.body,
            author: author.as_ref().map(UserSummary::from),
            ticket_id: comment.ticket_id,
            created_at: comment.created_at,
        });
    }

    Ok(Json(data))
}
