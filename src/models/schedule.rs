// src/models/schedule.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a schedule. Stored as text in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::InProgress => "In Progress",
            ScheduleStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown schedule status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl TryFrom<String> for ScheduleStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "In Progress" => Ok(ScheduleStatus::InProgress),
            "Completed" => Ok(ScheduleStatus::Completed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Represents the 'schedules' table: one row per schedule a user creates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Per-user schedule counter, starting at 1.
    pub seq_number: i32,

    pub title: String,

    /// Key joining the schedule to its topics, `{user_id}-{seq_number}`.
    pub utid: String,

    #[sqlx(try_from = "String")]
    pub status: ScheduleStatus,

    /// Sum of topic scores, set when the schedule is completed.
    pub result: Option<i32>,

    pub created_at: DateTime<Utc>,
}

/// Builds the key shared by a schedule and all of its topics.
pub fn schedule_key(user_id: Uuid, seq_number: i32) -> String {
    format!("{}-{}", user_id, seq_number)
}

/// DTO for creating a schedule.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 200, message = "Schedule title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one topic is required."))]
    pub topics: Vec<String>,
}
