use crate::domain::{models::ticket::Ticket, ports::TicketRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTicketRepo {
    pool: SqlitePool,
}

impl SqliteTicketRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepo {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, title, description, status, priority, client_id, assigned_to_id, service_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&ticket.id)
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(&ticket.status)
            .bind(&ticket.priority)
            .bind(&ticket.client_id)
            .bind(&ticket.assigned_to_id)
            .bind(&ticket.service_id)
            .bind(ticket.created_at)
            .bind(ticket.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_assignee(&self, user_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE assigned_to_id = ? ORDER BY created_at DESC",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET title = ?, description = ?, status = ?, priority = ?, assigned_to_id = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(&ticket.status)
            .bind(&ticket.priority)
            .bind(&ticket.assigned_to_id)
            .bind(ticket.updated_at)
            .bind(&ticket.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
