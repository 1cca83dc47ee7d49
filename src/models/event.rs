use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An event as the booking engine sees it: owned and mutated by the event
/// catalog, read-only here. `date` and `time` are display strings shown
/// verbatim on tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    #[sqlx(rename = "event_date")]
    pub date: String,
    #[sqlx(rename = "event_time")]
    pub time: String,
    /// `None` means unlimited capacity.
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}
