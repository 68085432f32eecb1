// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    models::{
        quiz::{QuizResponse, QuizTicket, SubmitQuizRequest},
        session::CurrentUser,
    },
    services::{progression, tutor::Tutor},
    state::SharedRepository,
    utils::jwt::{sign_quiz, verify_quiz},
};

/// Generates a true/false quiz for a topic.
///
/// Returns the questions and a signed `quiz_token` referring to the stored
/// answer key. The token must be sent back with the answers.
pub async fn generate_quiz(
    State(repo): State<SharedRepository>,
    State(tutor): State<Tutor>,
    State(config): State<Config>,
    Extension(current): Extension<CurrentUser>,
    Path((utid, seq_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let (_, topic) = progression::owned_topic(&*repo, current.user_id, &utid, seq_number).await?;
    let attempt = tutor.generate_quiz(&topic).await?;
    let quiz_token = sign_quiz(
        &QuizTicket::for_attempt(&attempt),
        &config.jwt_secret,
        config.quiz_token_ttl,
    )?;

    Ok(Json(QuizResponse {
        utid: attempt.utid,
        seq_number: attempt.seq_number,
        topic: topic.title,
        questions: attempt.questions,
        quiz_token,
        expires_in: config.quiz_token_ttl,
    }))
}

/// Scores a submitted quiz and stores the score on the topic.
///
/// * Compares each answer with the stored key (case-sensitive).
/// * A token can be submitted once.
/// * Without a token nothing can match, so the score is 0.
/// * Retakes overwrite the previous score.
pub async fn submit_quiz(
    State(repo): State<SharedRepository>,
    State(tutor): State<Tutor>,
    State(config): State<Config>,
    Extension(current): Extension<CurrentUser>,
    Path((utid, seq_number)): Path<(String, i32)>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (_, topic) = progression::owned_topic(&*repo, current.user_id, &utid, seq_number).await?;

    let ticket = match req.quiz_token.as_deref() {
        Some(token) => Some(
            verify_quiz(token, &config.jwt_secret)
                .map_err(|_| AppError::BadRequest("Invalid or expired quiz token".to_string()))?,
        ),
        None => None,
    };

    let result = tutor
        .submit_quiz(&topic, ticket.as_ref(), &req.answers)
        .await?;

    Ok(Json(result))
}
