use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_WAITING_ON_CLIENT: &str = "waiting_on_client";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_WAITING_ON_CLIENT,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

pub const PRIORITY_MEDIUM: &str = "medium";

pub const VALID_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub client_id: String,
    pub assigned_to_id: Option<String>,
    pub service_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(title: String, description: String, priority: String, client_id: String, service_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            status: STATUS_OPEN.to_string(),
            priority,
            client_id,
            assigned_to_id: None,
            service_id,
            created_at: now,
            updated_at: now,
        }
    }
}
