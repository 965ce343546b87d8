use std::sync::Arc;
use crate::domain::ports::{
    CommentRepository, ServiceRepository, TicketRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::notifications::NotificationService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub ticket_repo: Arc<dyn TicketRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub auth_service: Arc<AuthService>,
    pub notifier: Arc<NotificationService>,
}
