// src/repository/memory.rs

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppError,
    models::{
        quiz::QuizAttempt,
        schedule::{Schedule, ScheduleStatus, schedule_key},
        topic::Topic,
        user::{NewUser, User},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    schedules: Vec<Schedule>,
    topics: Vec<Topic>,
    quiz_attempts: Vec<QuizAttempt>,
}

/// In-process repository with the same semantics as `PgRepository`.
/// Used by the test suites.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store poisoned".to_string()))
    }
}

impl Tables {
    fn topic_mut(&mut self, utid: &str, seq_number: i32) -> Option<&mut Topic> {
        self.topics
            .iter_mut()
            .find(|t| t.utid == utid && t.seq_number == seq_number)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered.".to_string()));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn create_schedule(
        &self,
        user_id: Uuid,
        title: &str,
        topics: &[String],
    ) -> Result<(Schedule, Vec<Topic>), AppError> {
        let mut tables = self.lock()?;
        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Err(AppError::InternalServerError(format!(
                "schedule owner {} does not exist",
                user_id
            )));
        }

        let next_seq = tables
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.seq_number)
            .max()
            .unwrap_or(0)
            + 1;
        let utid = schedule_key(user_id, next_seq);
        let now = Utc::now();

        let schedule = Schedule {
            id: Uuid::new_v4(),
            user_id,
            seq_number: next_seq,
            title: title.to_string(),
            utid: utid.clone(),
            status: ScheduleStatus::InProgress,
            result: None,
            created_at: now,
        };
        let rows: Vec<Topic> = topics
            .iter()
            .enumerate()
            .map(|(i, topic)| Topic {
                id: Uuid::new_v4(),
                utid: utid.clone(),
                seq_number: i as i32 + 1,
                title: topic.clone(),
                content: None,
                score: None,
                completed: false,
                created_at: now,
            })
            .collect();

        // Both inserts happen under one lock, so readers never see half a schedule.
        tables.schedules.push(schedule.clone());
        tables.topics.extend(rows.iter().cloned());
        Ok((schedule, rows))
    }

    async fn list_schedules(&self, user_id: Uuid) -> Result<Vec<Schedule>, AppError> {
        let mut schedules: Vec<Schedule> = self
            .lock()?
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.seq_number);
        Ok(schedules)
    }

    async fn find_schedule(&self, utid: &str) -> Result<Option<Schedule>, AppError> {
        Ok(self
            .lock()?
            .schedules
            .iter()
            .find(|s| s.utid == utid)
            .cloned())
    }

    async fn list_topics(&self, utid: &str) -> Result<Vec<Topic>, AppError> {
        let mut topics: Vec<Topic> = self
            .lock()?
            .topics
            .iter()
            .filter(|t| t.utid == utid)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.seq_number);
        Ok(topics)
    }

    async fn find_topic(&self, utid: &str, seq_number: i32) -> Result<Option<Topic>, AppError> {
        Ok(self
            .lock()?
            .topics
            .iter()
            .find(|t| t.utid == utid && t.seq_number == seq_number)
            .cloned())
    }

    async fn complete_schedule(&self, utid: &str, result: i32) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        if let Some(schedule) = tables.schedules.iter_mut().find(|s| s.utid == utid) {
            schedule.status = ScheduleStatus::Completed;
            schedule.result = Some(result);
        }
        Ok(())
    }

    async fn set_topic_content(
        &self,
        utid: &str,
        seq_number: i32,
        content: &str,
    ) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        Ok(match tables.topic_mut(utid, seq_number) {
            Some(topic) => {
                topic.content = Some(content.to_string());
                true
            }
            None => false,
        })
    }

    async fn set_topic_completed(&self, utid: &str, seq_number: i32) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        Ok(match tables.topic_mut(utid, seq_number) {
            Some(topic) => {
                topic.completed = true;
                true
            }
            None => false,
        })
    }

    async fn set_topic_score(
        &self,
        utid: &str,
        seq_number: i32,
        score: i32,
    ) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        Ok(match tables.topic_mut(utid, seq_number) {
            Some(topic) => {
                topic.score = Some(score);
                true
            }
            None => false,
        })
    }

    async fn save_quiz_attempt(&self, attempt: &QuizAttempt) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        if tables.topic_mut(&attempt.utid, attempt.seq_number).is_none() {
            return Err(AppError::InternalServerError(format!(
                "quiz topic {} #{} does not exist",
                attempt.utid, attempt.seq_number
            )));
        }
        tables.quiz_attempts.push(attempt.clone());
        Ok(())
    }

    async fn take_quiz_attempt(&self, id: Uuid) -> Result<Option<QuizAttempt>, AppError> {
        let mut tables = self.lock()?;
        let index = tables.quiz_attempts.iter().position(|a| a.id == id);
        Ok(index.map(|i| tables.quiz_attempts.swap_remove(i)))
    }
}
