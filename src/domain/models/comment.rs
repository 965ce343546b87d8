use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub author_id: String,
    pub ticket_id: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(body: String, author_id: String, ticket_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            body,
            author_id,
            ticket_id,
            created_at: Utc::now(),
        }
    }
}
