#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};
use studymate_server::{AppError, AppState, LlmClient, Settings};
use uuid::Uuid;

/// Chat model double that replays canned replies and records prompts.
#[derive(Default)]
pub struct StubLlm {
    replies: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(user.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| AppError::Internal("no canned reply left".into()))
    }
}

pub fn test_settings() -> Settings {
    Settings::new_for_test().expect("Failed to load test config")
}

/// State over a pool that never connects; only requests that fail before
/// touching the database are safe to send.
pub fn offline_state(settings: Settings, llm: Arc<StubLlm>) -> AppState {
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(1))
        .connect_lazy(&settings.database.url)
        .expect("Failed to create lazy pool");
    AppState::from_parts(settings, pool, llm)
}

/// State over the database named by `DATABASE_URL`, migrations applied.
pub async fn live_state(llm: Arc<StubLlm>) -> AppState {
    let mut settings = test_settings();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database.url = url;
    }
    let pool = PgPoolOptions::new()
        .connect(&settings.database.url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    AppState::from_parts(settings, pool, llm)
}

pub fn bearer(state: &AppState, user_id: Uuid) -> (&'static str, String) {
    let token = state.auth_service.issue_token(user_id).expect("token");
    ("Authorization", format!("Bearer {}", token))
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}
