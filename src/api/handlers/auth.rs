use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::responses::{LoginResponse, UserProfile};
use crate::domain::models::user::{User, ROLE_CLIENT, VALID_ROLES};
use std::sync::Arc;
use argon2::{password_hash::{SaltString, PasswordHasher}, Argon2, PasswordHash, PasswordVerifier};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use serde_json::json;
use tracing::{error, info};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(serde::Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(serde::Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload.role.unwrap_or_else(|| ROLE_CLIENT.to_string());
    if !VALID_ROLES.contains(&role.as_str()) {
        return Err(AppError::Validation("Invalid role value".into()));
    }

    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Validation("User already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let raw_token = state.auth_service.generate_token();

    let mut user = User::new(payload.name, payload.email, password_hash, role);
    user.email_verification_token = Some(state.auth_service.hash_token(&raw_token));
    user.email_verification_expires = Some(Utc::now() + Duration::hours(24));

    let created = state.user_repo.create(&user).await?;

    if let Err(e) = state.notifier.send_verification_email(&created.email, &created.name, &raw_token).await {
        error!("Failed to send verification email to {}: {:?}", created.email, e);
    }

    info!("Registered user: {}", created.id);

    Ok((StatusCode::CREATED, Json(json!({
        "message": "User registered successfully. Please check your email to verify your account.",
        "emailSent": true
    }))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_email(&payload.email).await?
        .ok_or(AppError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal)?;

    Argon2::default().verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    if !user.email_verified {
        return Err(AppError::EmailNotVerified(user.email));
    }

    if !user.is_active {
        return Err(AppError::AccountDeactivated);
    }

    let token = state.auth_service.issue_token(&user)?;

    info!("User logged in: {}", user.id);

    Ok(Json(LoginResponse {
        token,
        user: UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            email_verified: user.email_verified,
        },
    }))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.token.is_empty() {
        return Err(AppError::Validation("Verification token is required".into()));
    }

    let token_hash = state.auth_service.hash_token(&payload.token);
    let mut user = state.user_repo.find_by_verification_token(&token_hash).await?
        .ok_or_else(|| AppError::Validation("Invalid verification token".into()))?;

    if user.email_verified {
        return Ok(Json(json!({
            "message": "Email is already verified! You can now log in.",
            "verified": true
        })));
    }

    if let Some(expires) = user.email_verification_expires {
        if Utc::now() > expires {
            return Err(AppError::Validation("Verification token has expired".into()));
        }
    }

    user.email_verified = true;
    user.email_verification_token = None;
    user.email_verification_expires = None;
    user.updated_at = Utc::now();

    let user = state.user_repo.update(&user).await?;

    info!("Email verified for user: {}", user.id);

    if let Err(e) = state.notifier.send_welcome_email(&user.email, &user.name).await {
        error!("Failed to send welcome email to {}: {:?}", user.email, e);
    }

    Ok(Json(json!({
        "message": "Email verified successfully! You can now log in.",
        "verified": true
    })))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Same body whether or not the account exists, so the endpoint cannot be
    // used to probe for registered emails.
    if let Some(mut user) = state.user_repo.find_by_email(&payload.email).await? {
        let raw_token = state.auth_service.generate_token();
        user.reset_token = Some(state.auth_service.hash_token(&raw_token));
        user.reset_token_expires = Some(Utc::now() + Duration::hours(1));
        user.updated_at = Utc::now();

        let user = state.user_repo.update(&user).await?;

        if let Err(e) = state.notifier.send_password_reset_email(&user.email, &user.name, &raw_token).await {
            error!("Failed to send password reset email to {}: {:?}", user.email, e);
        }

        info!("Password reset requested for user: {}", user.id);
    }

    Ok(Json(json!({
        "message": "If an account with that email exists, a password reset link has been sent."
    })))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long", MIN_PASSWORD_LEN
        )));
    }

    let token = extract_token(&payload.token);
    let token_hash = state.auth_service.hash_token(token);

    let mut user = state.user_repo.find_by_reset_token(&token_hash).await?
        .ok_or_else(|| AppError::Validation("Invalid or expired reset token".into()))?;

    match user.reset_token_expires {
        Some(expires) if expires > Utc::now() => {}
        _ => return Err(AppError::Validation("Invalid or expired reset token".into())),
    }

    user.password_hash = hash_password(&payload.new_password)?;
    user.reset_token = None;
    user.reset_token_expires = None;
    user.updated_at = Utc::now();

    let user = state.user_repo.update(&user).await?;

    info!("Password reset for user: {}", user.id);

    Ok(Json(json!({
        "message": "Password has been reset successfully. You can now log in with your new password."
    })))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string())
}

/// Some clients paste the whole reset link into the token field. Accept
/// either the bare token or a URL carrying a `token=` query parameter.
fn extract_token(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.rfind("token=") {
        Some(idx) => raw[idx + 6..].split('&').next().unwrap_or(""),
        None => raw,
    }
}
