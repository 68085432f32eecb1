// src/models/topic.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'topics' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: Uuid,

    /// Key of the owning schedule.
    pub utid: String,

    /// 1-based position within the schedule.
    pub seq_number: i32,

    pub title: String,

    /// Last generated explanation.
    pub content: Option<String>,

    /// Latest quiz score, 0..=5.
    pub score: Option<i32>,

    pub completed: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicState {
    Pending,
    Explained,
    Completed,
}

impl Topic {
    pub fn state(&self) -> TopicState {
        if self.completed {
            TopicState::Completed
        } else if self.content.as_deref().is_some_and(|c| !c.is_empty()) {
            TopicState::Explained
        } else {
            TopicState::Pending
        }
    }
}

/// A topic as listed to its owner, with its derived progress state.
#[derive(Debug, Serialize)]
pub struct TopicListItem {
    #[serde(flatten)]
    pub topic: Topic,
    pub state: TopicState,
}

impl From<Topic> for TopicListItem {
    fn from(topic: Topic) -> Self {
        let state = topic.state();
        Self { topic, state }
    }
}

/// Response for the "next topic" step.
#[derive(Debug, Serialize)]
pub struct TopicSummaryResponse {
    pub utid: String,
    pub seq_number: i32,
    pub topic: String,
    pub explanation: String,
    pub example: String,
}

/// Response for the detailed explanation step.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub utid: String,
    pub seq_number: i32,
    pub topic: String,
    pub explanation: String,
}
