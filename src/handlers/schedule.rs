// src/handlers/schedule.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        schedule::{CreateScheduleRequest, ScheduleStatus},
        session::CurrentUser,
        topic::{TopicListItem, TopicSummaryResponse},
        user::DashboardResponse,
    },
    services::{
        progression::{self, Advance},
        tutor::Tutor,
    },
    state::SharedRepository,
};

pub async fn home() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The logged-in user plus schedule counts.
pub async fn dashboard(
    State(repo): State<SharedRepository>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = repo
        .find_user(current.user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let schedules = progression::list_schedules(&*repo, current.user_id).await?;
    let completed = schedules
        .iter()
        .filter(|s| s.status == ScheduleStatus::Completed)
        .count();

    Ok(Json(DashboardResponse {
        user,
        schedules_in_progress: schedules.len() - completed,
        schedules_completed: completed,
    }))
}

/// Lists the current user's schedules. An empty list means none exist yet.
pub async fn list_schedules(
    State(repo): State<SharedRepository>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let schedules = progression::list_schedules(&*repo, current.user_id).await?;
    Ok(Json(schedules))
}

/// Creates a schedule and its topics in one transaction.
pub async fn create_schedule(
    State(repo): State<SharedRepository>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (schedule, topics) = progression::create_schedule(&*repo, current.user_id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Schedule created successfully!",
            "schedule": schedule,
            "topics": topics,
        })),
    ))
}

pub async fn list_topics(
    State(repo): State<SharedRepository>,
    Extension(current): Extension<CurrentUser>,
    Path(utid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let topics: Vec<TopicListItem> = progression::list_topics(&*repo, current.user_id, &utid)
        .await?
        .into_iter()
        .map(TopicListItem::from)
        .collect();
    Ok(Json(topics))
}

/// Moves the schedule forward.
///
/// * All topics done: completes the schedule and reports its result.
/// * Otherwise: summarizes the first unfinished topic with the LLM.
pub async fn next_topic(
    State(repo): State<SharedRepository>,
    State(tutor): State<Tutor>,
    Extension(current): Extension<CurrentUser>,
    Path(utid): Path<String>,
) -> Result<Response, AppError> {
    let schedule = progression::owned_schedule(&*repo, current.user_id, &utid).await?;

    match progression::advance_schedule(&*repo, &utid).await? {
        Advance::AllCovered { result } => Ok(Json(json!({
            "status": ScheduleStatus::Completed,
            "message": "All topics covered",
            "result": result,
        }))
        .into_response()),
        Advance::Next(topic) => {
            let summary = tutor.summarize_topic(&topic, &schedule.title).await?;
            Ok(Json(TopicSummaryResponse {
                utid: topic.utid,
                seq_number: topic.seq_number,
                topic: topic.title,
                explanation: summary.explanation,
                example: summary.example,
            })
            .into_response())
        }
    }
}
