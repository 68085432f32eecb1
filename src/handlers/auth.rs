// src/handlers/auth.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::{
        session::AuthSession,
        user::{CreateUserRequest, LoginRequest},
    },
    services::auth::{self, LoginOutcome},
    state::SharedRepository,
    utils::jwt::{bearer_token, sign_session, verify_session},
};

/// Registers a new user.
///
/// Returns 201 Created and the user object (excluding the password hash),
/// or 409 if the email is already registered.
pub async fn register(
    State(repo): State<SharedRepository>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth::register(&*repo, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful! Please log in.",
            "user": user,
        })),
    ))
}

/// Authenticates a user and returns a session token.
///
/// The caller's current session token (if any) is read from the
/// Authorization header so failed attempts are counted per session. A
/// failure answers 401 with the updated session token the client must send
/// on its next attempt.
pub async fn login(
    State(repo): State<SharedRepository>,
    State(config): State<Config>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    // Unreadable or expired tokens simply start a new session.
    let session = bearer_token(&headers)
        .and_then(|token| verify_session(token, &config.jwt_secret).ok())
        .unwrap_or_default();

    match auth::authenticate(&*repo, session, payload).await? {
        LoginOutcome::Authenticated { user, session } => {
            let token = sign_session(&session, &config.jwt_secret, config.jwt_expiration)?;
            Ok(Json(json!({
                "token": token,
                "type": "Bearer",
                "message": format!("Login successful! Welcome {}!", user.username),
                "user": user,
            }))
            .into_response())
        }
        LoginOutcome::Rejected { session } => {
            let token = sign_session(&session, &config.jwt_secret, config.jwt_expiration)?;
            let message = if session.is_locked() {
                "Too many failed attempts. Try later.".to_string()
            } else {
                format!(
                    "Incorrect credentials. Attempts left: {}",
                    session.attempts_left
                )
            };
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": message,
                    "attempts_left": session.attempts_left,
                    "session": token,
                })),
            )
                .into_response())
        }
    }
}

/// Drops all session state by handing out a fresh anonymous session.
pub async fn logout(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let token = sign_session(
        &AuthSession::anonymous(),
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "message": "Logged out successfully.",
        "session": token,
    })))
}
