use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

/// Authenticated caller, resolved from the `Authorization: Bearer <JWT>`
/// header. The claims are only trusted as a pointer; the user row is loaded
/// fresh so role changes and deactivations take effect immediately.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get("Authorization")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let token = header.strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let claims = app_state.auth_service.decode_token(token)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let user = app_state.user_repo.find_by_id(&claims.sub).await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}

pub fn require_role(user: &User, roles: &[&str]) -> Result<(), AppError> {
    if roles.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("Requires {} role", roles.join(" or "))))
    }
}
