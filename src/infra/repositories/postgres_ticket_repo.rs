use crate::domain::{models::ticket::Ticket, ports::TicketRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTicketRepo {
    pool: PgPool,
}

impl PostgresTicketRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepo {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, title, description, status, priority, client_id, assigned_to_id, service_id, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
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
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
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
            "SELECT * FROM tickets WHERE assigned_to_id = $1 ORDER BY created_at DESC",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET title = $1, description = $2, status = $3, priority = $4, assigned_to_id = $5, updated_at = $6 WHERE id = $7 RETURNING *",
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
