use crate::domain::models::{
    comment::Comment, service::Service, ticket::Ticket, user::User,
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_verification_token(&self, token_hash: &str) -> Result<Option<User>, AppError>;
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>, AppError>;
    async fn list(&self) -> Result<Vec<Ticket>, AppError>;
    async fn list_by_assignee(&self, user_id: &str) -> Result<Vec<Ticket>, AppError>;
    async fn update(&self, ticket: &Ticket) -> Result<Ticket, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self) -> Result<Vec<Service>, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;
    async fn list_by_ticket(&self, ticket_id: &str) -> Result<Vec<Comment>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
