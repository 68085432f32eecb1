// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

use crate::error::AppError;

/// Login attempts granted to a fresh session before it is locked out.
pub const MAX_LOGIN_ATTEMPTS: u8 = 3;

/// Number of true/false questions in every generated quiz.
pub const QUIZ_LENGTH: usize = 5;

/// Longest accepted topic title, in characters.
pub const MAX_TOPIC_TITLE_LEN: usize = 500;

/// Settings for the text-generation provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub summary_model: String,
    pub quiz_model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Seconds an idle connection may linger before it is closed.
    pub db_idle_timeout: u64,
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Quiz token lifetime in seconds.
    pub quiz_token_ttl: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let api_key = required("GOOGLE_API_KEY")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(addr) => addr
                .parse()
                .map_err(|e| AppError::InternalServerError(format!("Invalid BIND_ADDR: {}", e)))?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], parsed_or("PORT", 3000)?)),
        };

        let llm = LlmConfig {
            api_key,
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/".to_string()
            }),
            summary_model: env::var("SUMMARY_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash-lite".to_string()),
            quiz_model: env::var("QUIZ_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-lite".to_string()),
        };

        Ok(Self {
            database_url,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 5)?,
            db_idle_timeout: parsed_or("DB_IDLE_TIMEOUT", 1)?,
            jwt_secret,
            jwt_expiration: parsed_or("JWT_EXPIRATION", 86_400)?,
            quiz_token_ttl: parsed_or("QUIZ_TOKEN_TTL", 1_800)?,
            rust_log,
            bind_addr,
            llm,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} has an invalid value", key))),
        Err(_) => Ok(default),
    }
}
