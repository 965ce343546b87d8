use axum::{
    body::Body,
    extract::Request,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, comment, health, service, ticket, user};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify-email", post(auth::verify_email))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))

        // Tickets
        .route("/api/tickets", get(ticket::list_tickets).post(ticket::create_ticket))
        .route("/api/tickets/staff", get(ticket::staff_tickets))
        .route("/api/tickets/{id}", get(ticket::get_ticket).put(ticket::update_ticket))
        .route("/api/tickets/{id}/assign", patch(ticket::assign_ticket).put(ticket::assign_ticket))

        // Users
        .route("/api/users", get(user::list_users))
        .route("/api/users/{id}", get(user::get_user).put(user::update_user).delete(user::deactivate_user))

        // Services
        .route("/api/services", get(service::list_services).post(service::create_service))
        .route("/api/services/{id}", get(service::get_service))

        // Comments
        .route("/api/comments", post(comment::create_comment))
        .route("/api/comments/{ticket_id}", get(comment::list_comments))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
