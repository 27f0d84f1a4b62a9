//! Common test utilities and fixtures for integration tests.
//!
//! Every context runs against its own in-memory SQLite database, with the
//! language model replaced by [`StubCompletionClient`].

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::NaiveDate;

use zenbrain_backend::config::Config;
use zenbrain_backend::db::Database;
use zenbrain_backend::services::llm::{CompletionClient, CompletionRequest, LlmError};
use zenbrain_backend::{build_router, AppState};

/// Canned model replies, picked by which prompt is being answered.
/// `None` simulates a transport failure for that stage.
pub struct StubCompletionClient {
    pub available: bool,
    pub quiz: Option<String>,
    pub flashcards: Option<String>,
    pub study_plan: Option<String>,
    calls: AtomicUsize,
}

impl StubCompletionClient {
    pub fn new() -> Self {
        Self {
            available: true,
            quiz: Some(fixtures::QUIZ_REPLY.to_string()),
            flashcards: Some(fixtures::FLASHCARDS_REPLY.to_string()),
            study_plan: Some(fixtures::STUDY_PLAN_REPLY.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StubCompletionClient {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if !self.available {
            return Err(LlmError::NotConfigured);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = if request.prompt.contains("quiz questions") {
            &self.quiz
        } else if request.prompt.contains("flashcards for key terms") {
            &self.flashcards
        } else {
            &self.study_plan
        };
        reply.clone().ok_or(LlmError::EmptyChoices)
    }
}

/// Test context holding the database, the model stub and the router
pub struct TestContext {
    pub db: Arc<Database>,
    pub llm: Arc<StubCompletionClient>,
    pub state: AppState,
}

impl TestContext {
    /// Create a context with the default model stub.
    pub async fn new() -> Self {
        Self::with_llm(StubCompletionClient::new()).await
    }

    /// Create a context with a custom model stub.
    pub async fn with_llm(llm: StubCompletionClient) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let config = Config {
            bcrypt_cost: 4,
            ..Config::default()
        };

        let llm = Arc::new(llm);
        let state = AppState::new(db, llm.clone(), config);

        Self {
            db: state.db.clone(),
            llm,
            state,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Study day the handlers consider "today".
    pub fn today(&self) -> NaiveDate {
        self.state.today()
    }

    /// Create a registered user directly and return its id and token.
    pub async fn create_test_user(&self, username: &str) -> (i64, String) {
        let user = self
            .db
            .create_user(username, None, None, false)
            .await
            .expect("Failed to create test user");
        let token = self
            .db
            .create_session(user.id)
            .await
            .expect("Failed to create session");
        (user.id, token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }
}
