use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const VALID_STATUSES: [&str; 4] = ["pending", "in_progress", "ready_to_test", "closed"];
pub const VALID_PRIORITIES: [&str; 3] = ["high", "medium", "low"];

pub fn validate_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}

pub fn validate_priority(priority: &str) -> bool {
    VALID_PRIORITIES.contains(&priority)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub project: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}
