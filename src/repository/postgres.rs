// src/repository/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use uuid::Uuid;

use super::Repository;
use crate::{
    config::Config,
    error::AppError,
    models::{
        quiz::QuizAttempt,
        schedule::{Schedule, ScheduleStatus, schedule_key},
        topic::Topic,
        user::{NewUser, User},
    },
};

const SCHEDULE_COLUMNS: &str =
    "id, user_id, seq_number, title, utid, status, result, created_at";
const TOPIC_COLUMNS: &str = "id, utid, seq_number, title, content, score, completed, created_at";

/// PostgreSQL-backed repository.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool that keeps no idle connections around between requests.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(0)
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .acquire_timeout(Duration::from_secs(3))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the schema migrations. Run once at startup before serving.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::Conflict("Email already registered.".to_string())
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password_hash, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_schedule(
        &self,
        user_id: Uuid,
        title: &str,
        topics: &[String],
    ) -> Result<(Schedule, Vec<Topic>), AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent creates for the same user until commit.
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owner.is_none() {
            return Err(AppError::InternalServerError(format!(
                "schedule owner {} does not exist",
                user_id
            )));
        }

        let next_seq: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(seq_number), 0) + 1 FROM schedules WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let utid = schedule_key(user_id, next_seq);

        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            r#"
            INSERT INTO schedules (id, user_id, seq_number, title, utid, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(next_seq)
        .bind(title)
        .bind(&utid)
        .bind(ScheduleStatus::InProgress.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::Conflict("Schedule was created concurrently, please retry.".to_string())
            } else {
                tracing::error!("Failed to insert schedule {}: {:?}", utid, e);
                AppError::from(e)
            }
        })?;

        let mut builder =
            QueryBuilder::<Postgres>::new("INSERT INTO topics (id, utid, seq_number, title, completed) ");
        builder.push_values(topics.iter().enumerate(), |mut row, (i, topic)| {
            row.push_bind(Uuid::new_v4())
                .push_bind(utid.as_str())
                .push_bind(i as i32 + 1)
                .push_bind(topic.as_str())
                .push_bind(false);
        });
        builder.push(" RETURNING ");
        builder.push(TOPIC_COLUMNS);

        let mut rows: Vec<Topic> = builder
            .build_query_as()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert topics for {}: {:?}", utid, e);
                AppError::from(e)
            })?;

        // Dropping `tx` on an early return rolls both inserts back.
        tx.commit().await?;

        rows.sort_by_key(|t| t.seq_number);
        Ok((schedule, rows))
    }

    async fn list_schedules(&self, user_id: Uuid) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE user_id = $1 ORDER BY seq_number ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(schedules)
    }

    async fn find_schedule(&self, utid: &str) -> Result<Option<Schedule>, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE utid = $1"
        ))
        .bind(utid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(schedule)
    }

    async fn list_topics(&self, utid: &str) -> Result<Vec<Topic>, AppError> {
        let topics = sqlx::query_as::<_, Topic>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE utid = $1 ORDER BY seq_number ASC"
        ))
        .bind(utid)
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn find_topic(&self, utid: &str, seq_number: i32) -> Result<Option<Topic>, AppError> {
        let topic = sqlx::query_as::<_, Topic>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE utid = $1 AND seq_number = $2"
        ))
        .bind(utid)
        .bind(seq_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(topic)
    }

    async fn complete_schedule(&self, utid: &str, result: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE schedules SET status = $1, result = $2 WHERE utid = $3")
            .bind(ScheduleStatus::Completed.as_str())
            .bind(result)
            .bind(utid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_topic_content(
        &self,
        utid: &str,
        seq_number: i32,
        content: &str,
    ) -> Result<bool, AppError> {
        let done = sqlx::query("UPDATE topics SET content = $1 WHERE utid = $2 AND seq_number = $3")
            .bind(content)
            .bind(utid)
            .bind(seq_number)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn set_topic_completed(&self, utid: &str, seq_number: i32) -> Result<bool, AppError> {
        let done =
            sqlx::query("UPDATE topics SET completed = TRUE WHERE utid = $1 AND seq_number = $2")
                .bind(utid)
                .bind(seq_number)
                .execute(&self.pool)
                .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn set_topic_score(
        &self,
        utid: &str,
        seq_number: i32,
        score: i32,
    ) -> Result<bool, AppError> {
        let done = sqlx::query("UPDATE topics SET score = $1 WHERE utid = $2 AND seq_number = $3")
            .bind(score)
            .bind(utid)
            .bind(seq_number)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn save_quiz_attempt(&self, attempt: &QuizAttempt) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (id, utid, seq_number, questions, answers)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(attempt.id)
        .bind(&attempt.utid)
        .bind(attempt.seq_number)
        .bind(attempt.questions.as_slice())
        .bind(attempt.answers.as_slice())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn take_quiz_attempt(&self, id: Uuid) -> Result<Option<QuizAttempt>, AppError> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            DELETE FROM quiz_attempts WHERE id = $1
            RETURNING id, utid, seq_number, questions, answers
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }
}
