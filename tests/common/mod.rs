// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use study_planner::{
    config::{Config, LlmConfig},
    llm::{CompletionRequest, LlmError, LlmProvider},
    repository::MemoryRepository,
    routes,
    state::AppState,
};

pub const FIVE_QUESTION_QUIZ: &str = "Q1: The sky is blue.\nA1: True\n\
Q2: Fire is cold.\nA2: False\n\
Q3: Two plus two is four.\nA3: True\n\
Q4: Fish can climb trees.\nA4: False\n\
Q5: Water boils at 100C at sea level.\nA5: True\n";

/// Deterministic stand-in for the LLM, answering by prompt kind.
pub struct ScriptedProvider {
    pub quiz_output: Mutex<String>,
    pub fail: Mutex<bool>,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            quiz_output: Mutex::new(FIVE_QUESTION_QUIZ.to_string()),
            fail: Mutex::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_quiz(&self, output: &str) {
        *self.quiz_output.lock().unwrap() = output.to_string();
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            return Err(LlmError::Request("scripted outage".to_string()));
        }

        let prompt = &request.prompt;
        let topic = prompt
            .split('"')
            .nth(1)
            .unwrap_or("the topic")
            .to_string();

        if prompt.contains("True/False") {
            Ok(self.quiz_output.lock().unwrap().clone())
        } else if prompt.contains("bullet points") {
            Ok(format!("- {topic} is neat\n- {topic} is useful\n"))
        } else {
            Ok(format!(
                "{topic} explained simply.\n\nA real-life example of {topic}."
            ))
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "memory".to_string(),
        db_max_connections: 1,
        db_idle_timeout: 1,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        quiz_token_ttl: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        llm: LlmConfig {
            api_key: "unused".to_string(),
            base_url: "http://127.0.0.1:9/".to_string(),
            summary_model: "summary-model".to_string(),
            quiz_model: "quiz-model".to_string(),
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub llm: Arc<ScriptedProvider>,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port, backed by the in-memory repository.
pub async fn spawn_app() -> TestApp {
    let llm = Arc::new(ScriptedProvider::new());
    let state = AppState::new(
        Arc::new(MemoryRepository::new()),
        llm.clone(),
        test_config(),
    );
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        llm,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user and returns its session token.
    pub async fn signed_in_user(&self) -> String {
        let email = format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
        let password = "password123";

        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "username": "Tester",
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Register failed");
        assert_eq!(response.status().as_u16(), 201);

        let login: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        login["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, token: &str, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a schedule and returns its key.
    pub async fn create_schedule(&self, token: &str, title: &str, topics: &[&str]) -> String {
        let response = self
            .post(
                token,
                "/api/schedules",
                serde_json::json!({ "title": title, "topics": topics }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["schedule"]["utid"].as_str().unwrap().to_string()
    }
}
