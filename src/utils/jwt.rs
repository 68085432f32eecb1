// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{
        quiz::QuizTicket,
        session::{AuthSession, CurrentUser},
    },
};

/// Session token claims.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionClaims {
    /// Subject - the authenticated user's ID, absent for anonymous sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Login attempts left in this session.
    pub attempts: u8,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Quiz token claims. Only points at the stored attempt; the answers stay server-side.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuizClaims {
    #[serde(flatten)]
    pub ticket: QuizTicket,
    pub exp: usize,
}

fn expires_in(seconds: u64) -> Result<usize, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();
    Ok((now + seconds) as usize)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, AppError> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))
}

/// Signs a session token carrying the user (if any) and the attempt counter.
pub fn sign_session(
    session: &AuthSession,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: session.user_id.map(|id| id.to_string()),
        attempts: session.attempts_left,
        exp: expires_in(expiration_seconds)?,
    };
    sign(&claims, secret)
}

/// Verifies and decodes a session token.
pub fn verify_session(token: &str, secret: &str) -> Result<AuthSession, AppError> {
    let claims: SessionClaims = verify(token, secret)?;
    let user_id = match claims.sub {
        Some(sub) => Some(
            sub.parse::<Uuid>()
                .map_err(|_| AppError::AuthError("Invalid token".to_string()))?,
        ),
        None => None,
    };
    Ok(AuthSession {
        user_id,
        attempts_left: claims.attempts,
    })
}

pub fn sign_quiz(ticket: &QuizTicket, secret: &str, ttl_seconds: u64) -> Result<String, AppError> {
    let claims = QuizClaims {
        ticket: ticket.clone(),
        exp: expires_in(ttl_seconds)?,
    };
    sign(&claims, secret)
}

pub fn verify_quiz(token: &str, secret: &str) -> Result<QuizTicket, AppError> {
    let claims: QuizClaims = verify(token, secret)?;
    Ok(claims.ticket)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Axum Middleware: Authentication.
///
/// Requires a session token that identifies a user. Injects `CurrentUser`
/// into the request extensions; anything else is 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let session =
        verify_session(token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user_id = session.user_id.ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(CurrentUser { user_id });
    Ok(next.run(req).await)
}
