// src/services/auth.rs

use validator::Validate;

use crate::{
    error::AppError,
    models::{
        session::AuthSession,
        user::{CreateUserRequest, LoginRequest, NewUser, User},
    },
    repository::Repository,
    utils::hash::{hash_password, verify_password},
};

/// Result of a login attempt that was allowed to run.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated { user: User, session: AuthSession },
    Rejected { session: AuthSession },
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new user. The password is hashed with Argon2 before storage.
pub async fn register(repo: &dyn Repository, payload: CreateUserRequest) -> Result<User, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered.".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = repo
        .create_user(NewUser {
            username: payload.username.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {}", user.user_id);
    Ok(user)
}

/// Checks credentials against the stored hash.
///
/// A locked session is refused before credentials are looked at. Failures
/// consume one attempt from the session; success returns a fresh session for
/// the user with the counter cleared.
pub async fn authenticate(
    repo: &dyn Repository,
    mut session: AuthSession,
    payload: LoginRequest,
) -> Result<LoginOutcome, AppError> {
    if session.is_locked() {
        tracing::warn!("Login refused: session locked");
        return Err(AppError::TooManyAttempts(
            "Too many failed attempts. Try later.".to_string(),
        ));
    }
    payload.validate()?;

    let user = repo.find_user_by_email(&normalize_email(&payload.email)).await?;
    let verified = match &user {
        Some(user) => verify_password(&payload.password, &user.password_hash)?,
        None => false,
    };

    match user {
        Some(user) if verified => {
            tracing::info!("User {} logged in", user.user_id);
            Ok(LoginOutcome::Authenticated {
                session: AuthSession::sign_in(user.user_id),
                user,
            })
        }
        _ => {
            session.user_id = None;
            session.record_failure();
            tracing::warn!("Failed login, {} attempts left", session.attempts_left);
            Ok(LoginOutcome::Rejected { session })
        }
    }
}
