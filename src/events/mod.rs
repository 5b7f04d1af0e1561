//! Event listings as seen by the cleanup engine.

pub mod store;

pub use self::store::EventStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Publication status of an event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Closed,
    Draft,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Upcoming => write!(f, "upcoming"),
            EventStatus::Ongoing => write!(f, "ongoing"),
            EventStatus::Closed => write!(f, "closed"),
            EventStatus::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "closed" => Ok(EventStatus::Closed),
            "draft" => Ok(EventStatus::Draft),
            other => Err(anyhow::anyhow!("unknown event status: {other}")),
        }
    }
}

/// An event listing row.
///
/// An event is expired when its `deadline` is in the past and its status is
/// not [`EventStatus::Closed`]. Events without a deadline never expire.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub status: EventStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Build a new event with a fresh identity, stamped at `now`.
    pub fn new(
        title: impl Into<String>,
        status: EventStatus,
        deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            status,
            deadline,
            created_at: now,
            updated_at: now,
        }
    }
}
