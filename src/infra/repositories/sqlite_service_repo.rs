use crate::domain::{models::service::Service, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteServiceRepo {
    pool: SqlitePool,
}

impl SqliteServiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepo {
    async fn create(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING id, name, description, created_at, updated_at",
        )
            .bind(&service.id)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.created_at)
            .bind(service.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT id, name, description, created_at, updated_at FROM services WHERE id = ?",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT id, name, description, created_at, updated_at FROM services ORDER BY name ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
