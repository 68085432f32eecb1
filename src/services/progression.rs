// src/services/progression.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{MAX_TOPIC_TITLE_LEN, QUIZ_LENGTH},
    error::AppError,
    models::{
        schedule::{CreateScheduleRequest, Schedule},
        topic::Topic,
    },
    repository::Repository,
};

/// What a schedule should do next.
#[derive(Debug, Clone)]
pub enum Advance {
    /// The lowest-numbered topic that is not completed yet.
    Next(Topic),
    /// Every topic is completed; the schedule now carries this result.
    AllCovered { result: i32 },
}

/// Sum of topic scores, unscored topics counting as zero.
pub fn total_score(topics: &[Topic]) -> i32 {
    topics.iter().map(|t| t.score.unwrap_or(0)).sum()
}

/// Creates a schedule with one topic per non-blank title, numbered 1..=N.
pub async fn create_schedule(
    repo: &dyn Repository,
    user_id: Uuid,
    payload: CreateScheduleRequest,
) -> Result<(Schedule, Vec<Topic>), AppError> {
    payload.validate()?;

    // Stored as submitted, only trimmed.
    let title = payload.title.trim().to_string();
    let topics: Vec<String> = payload
        .topics
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if title.is_empty() || topics.is_empty() {
        return Err(AppError::BadRequest(
            "Schedule title and at least one topic are required.".to_string(),
        ));
    }
    if let Some(long) = topics
        .iter()
        .find(|t| t.chars().count() > MAX_TOPIC_TITLE_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "Topic titles are limited to {} characters ('{}...').",
            MAX_TOPIC_TITLE_LEN,
            long.chars().take(20).collect::<String>()
        )));
    }

    let (schedule, topics) = repo.create_schedule(user_id, &title, &topics).await?;
    tracing::info!(
        "Created schedule {} with {} topics",
        schedule.utid,
        topics.len()
    );
    Ok((schedule, topics))
}

pub async fn list_schedules(repo: &dyn Repository, user_id: Uuid) -> Result<Vec<Schedule>, AppError> {
    repo.list_schedules(user_id).await
}

/// Loads a schedule, treating other users' schedules as missing.
pub async fn owned_schedule(
    repo: &dyn Repository,
    user_id: Uuid,
    utid: &str,
) -> Result<Schedule, AppError> {
    repo.find_schedule(utid)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or(AppError::NotFound("Schedule not found".to_string()))
}

pub async fn owned_topic(
    repo: &dyn Repository,
    user_id: Uuid,
    utid: &str,
    seq_number: i32,
) -> Result<(Schedule, Topic), AppError> {
    let schedule = owned_schedule(repo, user_id, utid).await?;
    let topic = repo
        .find_topic(utid, seq_number)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;
    Ok((schedule, topic))
}

pub async fn list_topics(
    repo: &dyn Repository,
    user_id: Uuid,
    utid: &str,
) -> Result<Vec<Topic>, AppError> {
    owned_schedule(repo, user_id, utid).await?;
    repo.list_topics(utid).await
}

/// Picks the next topic in strict sequence order, or completes the schedule
/// when every topic is done.
pub async fn advance_schedule(repo: &dyn Repository, utid: &str) -> Result<Advance, AppError> {
    let topics = repo.list_topics(utid).await?;
    if topics.is_empty() {
        return Err(AppError::NotFound(
            "No topics found for this schedule".to_string(),
        ));
    }

    match topics.iter().find(|t| !t.completed) {
        Some(next) => Ok(Advance::Next(next.clone())),
        None => {
            let result = total_score(&topics);
            repo.complete_schedule(utid, result).await?;
            tracing::info!("Schedule {} completed with result {}", utid, result);
            Ok(Advance::AllCovered { result })
        }
    }
}

/// Idempotent. Does not complete the schedule; call `advance_schedule` for that.
pub async fn mark_topic_complete(
    repo: &dyn Repository,
    utid: &str,
    seq_number: i32,
) -> Result<(), AppError> {
    if !repo.set_topic_completed(utid, seq_number).await? {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }
    Ok(())
}

/// Overwrites the topic's score; the last submission wins.
pub async fn record_quiz_score(
    repo: &dyn Repository,
    utid: &str,
    seq_number: i32,
    score: i32,
) -> Result<(), AppError> {
    if !(0..=QUIZ_LENGTH as i32).contains(&score) {
        return Err(AppError::BadRequest(format!(
            "Score must be between 0 and {}",
            QUIZ_LENGTH
        )));
    }
    if !repo.set_topic_score(utid, seq_number, score).await? {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }
    Ok(())
}
