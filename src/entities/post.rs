use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of a board post this crate reads and writes: its identity and the reply
/// aggregates maintained alongside every reply insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub reply_count: u32,
    pub last_reply_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
