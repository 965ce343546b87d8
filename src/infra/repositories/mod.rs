pub mod sqlite_user_repo;
pub mod sqlite_ticket_repo;
pub mod sqlite_service_repo;
pub mod sqlite_comment_repo;

pub mod postgres_user_repo;
pub mod postgres_ticket_repo;
pub mod postgres_service_repo;
pub mod postgres_comment_repo;
