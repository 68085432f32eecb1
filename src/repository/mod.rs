// src/repository/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        quiz::QuizAttempt,
        schedule::Schedule,
        topic::Topic,
        user::{NewUser, User},
    },
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Storage seam for users, schedules, topics and pending quizzes.
///
/// Only quiz attempts are ever deleted, when they are taken for scoring. Topic updates are addressed by schedule key and
/// sequence number and return whether a row matched.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    /// Inserts the schedule and one topic per title (sequence 1..=N) atomically.
    /// The per-user sequence number is the current maximum plus one.
    async fn create_schedule(
        &self,
        user_id: Uuid,
        title: &str,
        topics: &[String],
    ) -> Result<(Schedule, Vec<Topic>), AppError>;

    async fn list_schedules(&self, user_id: Uuid) -> Result<Vec<Schedule>, AppError>;

    async fn find_schedule(&self, utid: &str) -> Result<Option<Schedule>, AppError>;

    /// Topics ordered by ascending sequence number.
    async fn list_topics(&self, utid: &str) -> Result<Vec<Topic>, AppError>;

    async fn find_topic(&self, utid: &str, seq_number: i32) -> Result<Option<Topic>, AppError>;

    async fn complete_schedule(&self, utid: &str, result: i32) -> Result<(), AppError>;

    async fn set_topic_content(
        &self,
        utid: &str,
        seq_number: i32,
        content: &str,
    ) -> Result<bool, AppError>;

    async fn set_topic_completed(&self, utid: &str, seq_number: i32) -> Result<bool, AppError>;

    async fn set_topic_score(
        &self,
        utid: &str,
        seq_number: i32,
        score: i32,
    ) -> Result<bool, AppError>;

    async fn save_quiz_attempt(&self, attempt: &QuizAttempt) -> Result<(), AppError>;

    /// Removes and returns a pending quiz, so each one is scored at most once.
    async fn take_quiz_attempt(&self, id: Uuid) -> Result<Option<QuizAttempt>, AppError>;
}
