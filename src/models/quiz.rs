// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated quiz waiting to be answered.
/// Represents the 'quiz_attempts' table; the answer key never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub utid: String,
    pub seq_number: i32,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

/// What the client holds between generating and submitting a quiz:
/// a reference to the stored attempt and the topic it was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTicket {
    pub attempt_id: Uuid,
    pub utid: String,
    pub seq_number: i32,
}

impl QuizTicket {
    pub fn for_attempt(attempt: &QuizAttempt) -> Self {
        Self {
            attempt_id: attempt.id,
            utid: attempt.utid.clone(),
            seq_number: attempt.seq_number,
        }
    }

    pub fn is_for(&self, utid: &str, seq_number: i32) -> bool {
        self.utid == utid && self.seq_number == seq_number
    }
}

/// DTO returned when a quiz is generated. Excludes the answers.
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub utid: String,
    pub seq_number: i32,
    pub topic: String,
    pub questions: Vec<String>,
    pub quiz_token: String,
    pub expires_in: u64, // seconds
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// The token received when the quiz was generated.
    pub quiz_token: Option<String>,

    /// Answers by question index ("True" / "False").
    #[serde(default)]
    pub answers: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizReviewItem {
    pub question: Option<String>,
    pub submitted: Option<String>,
    pub correct: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: i32,
    pub total: usize,
    pub review: Vec<QuizReviewItem>,
}
