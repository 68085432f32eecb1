// src/handlers/topic.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{session::CurrentUser, topic::DetailResponse},
    services::{progression, tutor::Tutor},
    state::SharedRepository,
};

/// Marks one topic done. The schedule itself is only completed by the next
/// call to the "next topic" endpoint.
pub async fn mark_complete(
    State(repo): State<SharedRepository>,
    Extension(current): Extension<CurrentUser>,
    Path((utid, seq_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    progression::owned_topic(&*repo, current.user_id, &utid, seq_number).await?;
    progression::mark_topic_complete(&*repo, &utid, seq_number).await?;

    Ok(Json(json!({
        "utid": utid,
        "seq_number": seq_number,
        "completed": true,
        "message": "Topic completed. Ask for the next topic to continue.",
    })))
}

/// Detailed bullet-point explanation; replaces the topic's stored content.
pub async fn explain_more(
    State(repo): State<SharedRepository>,
    State(tutor): State<Tutor>,
    Extension(current): Extension<CurrentUser>,
    Path((utid, seq_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let (_, topic) = progression::owned_topic(&*repo, current.user_id, &utid, seq_number).await?;
    let explanation = tutor.detail_explain(&topic).await?;

    Ok(Json(DetailResponse {
        utid: topic.utid,
        seq_number: topic.seq_number,
        topic: topic.title,
        explanation,
    }))
}
