pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::extraction::Extractor;
use crate::services::llm::{ChatCompletionsClient, CompletionClient};

/// Syllabus PDFs can be larger than axum's 2 MB default
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub llm: Arc<dyn CompletionClient>,
    pub extractor: Extractor,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, llm: Arc<dyn CompletionClient>, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            llm,
            extractor: Extractor::new(config.fetch_timeout),
            config: Arc::new(config),
        }
    }

    /// Current study day, honouring the configured reset hour
    pub fn today(&self) -> NaiveDate {
        db::date_utils::study_today(self.config.daily_reset_hour)
    }
}

/// Build the full router; everything except auth entry points requires a bearer token
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Auth routes
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        // Flashcard routes
        .route(
            "/api/decks",
            get(routes::flashcards::list_decks).post(routes::flashcards::create_deck),
        )
        .route(
            "/api/decks/{id}",
            get(routes::flashcards::get_deck)
                .put(routes::flashcards::update_deck)
                .delete(routes::flashcards::delete_deck),
        )
        .route("/api/decks/{id}/cards", post(routes::flashcards::add_card))
        .route("/api/decks/{id}/due", get(routes::flashcards::due_cards))
        .route(
            "/api/cards/{id}",
            put(routes::flashcards::update_card)
                .delete(routes::flashcards::delete_card),
        )
        .route("/api/cards/{id}/review", post(routes::flashcards::review_card))
        // Quiz routes
        .route(
            "/api/quizzes",
            get(routes::quizzes::list_quizzes).post(routes::quizzes::create_quiz),
        )
        .route(
            "/api/quizzes/{id}",
            get(routes::quizzes::get_quiz)
                .put(routes::quizzes::update_quiz)
                .delete(routes::quizzes::delete_quiz),
        )
        .route("/api/quizzes/{id}/questions", post(routes::quizzes::add_question))
        .route("/api/quizzes/{id}/submit", post(routes::quizzes::submit_quiz))
        .route(
            "/api/questions/{id}",
            put(routes::quizzes::update_question)
                .delete(routes::quizzes::delete_question),
        )
        // Pomodoro routes
        .route(
            "/api/pomodoro/settings",
            get(routes::pomodoro::get_settings).put(routes::pomodoro::update_settings),
        )
        .route(
            "/api/pomodoro/sessions",
            get(routes::pomodoro::list_sessions).post(routes::pomodoro::log_session),
        )
        // Stats routes
        .route("/api/stats/daily", get(routes::stats::daily))
        .route("/api/dashboard", get(routes::stats::dashboard))
        // Syllabus routes
        .route("/api/syllabus", get(routes::syllabus::list))
        .route("/api/syllabus/parse", post(routes::syllabus::parse))
        .route("/api/syllabus/generate", post(routes::syllabus::generate))
        .route(
            "/api/syllabus/{id}",
            get(routes::syllabus::get).delete(routes::syllabus::delete),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/guest", post(routes::auth::guest))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let llm = ChatCompletionsClient::new(config.llm.clone());
    if !llm.is_available() {
        tracing::warn!("No language model API key configured; syllabus generation is disabled");
    }

    let addr = config.bind_addr();
    let state = AppState::new(db, Arc::new(llm), config);
    let app = build_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
