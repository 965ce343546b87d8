use crate::domain::{models::comment::Comment, ports::CommentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCommentRepo {
    pool: SqlitePool,
}

impl SqliteCommentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepo {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, body, author_id, ticket_id, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id, body, author_id, ticket_id, created_at",
        )
            .bind(&comment.id)
            .bind(&comment.body)
            .bind(&comment.author_id)
            .bind(&comment.ticket_id)
            .bind(comment.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_ticket(&self, ticket_id: &str) -> Result<Vec<Comment>, AppError> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, body, author_id, ticket_id, created_at FROM comments WHERE ticket_id = ? ORDER BY created_at ASC",
        )
            .bind(ticket_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
