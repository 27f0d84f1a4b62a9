//! Database models and API types

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// Re-export shared types from study-core
pub use study_core::{
    AnswerKey, CardSchedule, DailyCounters, GenerationTarget, PomodoroSettings, QuestionType,
    QuizGrade, ReviewQuality, SessionType,
};

// === Database Entity Types ===

/// Registered or guest user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
}

/// Flashcard deck row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDeck {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Deck with card counts for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub subject: String,
    pub updated_at: DateTime<Utc>,
    pub card_count: i64,
    pub due_count: i64,
}

/// Flashcard row, including its SM-2 state
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFlashcard {
    pub id: i64,
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    pub ease_factor: f64,
    pub interval_days: i64,
    pub repetitions: i64,
    pub next_review_date: NaiveDate,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DbFlashcard {
    /// Convert to study-core scheduling state
    pub fn to_schedule(&self) -> CardSchedule {
        CardSchedule {
            ease_factor: self.ease_factor,
            interval_days: u32::try_from(self.interval_days.max(0)).unwrap_or(u32::MAX),
            repetitions: u32::try_from(self.repetitions.max(0)).unwrap_or(u32::MAX),
            next_review_date: Some(self.next_review_date),
        }
    }
}

/// Quiz row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuiz {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quiz with question count and best attempt for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub updated_at: DateTime<Utc>,
    pub question_count: i64,
    pub best_score: Option<f64>,
}

/// Quiz question row. `options` holds a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub correct_answer: String,
    pub options: String,
    pub explanation: String,
    pub points: i64,
    pub order_num: i64,
}

impl DbQuestion {
    /// Decode for the API; an unreadable options column becomes an empty list
    pub fn to_api_question(&self) -> Question {
        Question {
            id: self.id,
            quiz_id: self.quiz_id,
            question_text: self.question_text.clone(),
            question_type: self.question_type.clone(),
            correct_answer: self.correct_answer.clone(),
            options: serde_json::from_str(&self.options).unwrap_or_default(),
            explanation: self.explanation.clone(),
            points: self.points,
            order_num: self.order_num,
        }
    }

    pub fn answer_key(&self) -> AnswerKey {
        AnswerKey {
            question_id: self.id,
            correct_answer: self.correct_answer.clone(),
            explanation: self.explanation.clone(),
            points: self.points,
        }
    }
}

/// Question with decoded options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub explanation: String,
    pub points: i64,
    pub order_num: i64,
}

/// New question ready for insertion
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub explanation: String,
    pub points: i64,
}

/// Stored pomodoro preferences
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPomodoroSettings {
    pub user_id: i64,
    pub focus_duration: i64,
    pub short_break_duration: i64,
    pub long_break_duration: i64,
    pub sessions_until_long_break: i64,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    pub sound_enabled: bool,
}

impl DbPomodoroSettings {
    /// Convert to study-core settings
    pub fn to_core_settings(&self) -> PomodoroSettings {
        PomodoroSettings {
            focus_duration: self.focus_duration.max(0) as u32,
            short_break_duration: self.short_break_duration.max(0) as u32,
            long_break_duration: self.long_break_duration.max(0) as u32,
            sessions_until_long_break: self.sessions_until_long_break.max(0) as u32,
            auto_start_breaks: self.auto_start_breaks,
            auto_start_focus: self.auto_start_focus,
            sound_enabled: self.sound_enabled,
        }
    }
}

/// Logged pomodoro session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPomodoroSession {
    pub id: i64,
    pub user_id: i64,
    pub session_type: String,
    pub duration_minutes: i64,
    pub notes: String,
    pub completed_at: DateTime<Utc>,
}

/// Syllabus row. `study_plan` holds JSON text when generated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSyllabus {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub content: String,
    pub study_plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbSyllabus {
    /// Decode for the API; an undecodable plan is reported as absent
    pub fn to_api_syllabus(&self) -> Syllabus {
        Syllabus {
            id: self.id,
            name: self.name.clone(),
            content: self.content.clone(),
            study_plan: self
                .study_plan
                .as_deref()
                .and_then(|p| serde_json::from_str(p).ok()),
            created_at: self.created_at,
        }
    }
}

/// Syllabus with decoded study plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Syllabus {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub study_plan: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Daily aggregate row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDailyStats {
    pub user_id: i64,
    pub date: NaiveDate,
    pub pomodoro_count: i64,
    pub focus_minutes: i64,
    pub cards_reviewed: i64,
    pub quizzes_taken: i64,
    pub average_quiz_score: f64,
}

impl DbDailyStats {
    pub fn to_counters(&self) -> DailyCounters {
        DailyCounters {
            pomodoro_count: self.pomodoro_count,
            focus_minutes: self.focus_minutes,
            cards_reviewed: self.cards_reviewed,
            quizzes_taken: self.quizzes_taken,
            average_quiz_score: self.average_quiz_score,
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub success: bool,
}

impl CreatedResponse {
    pub fn new(id: i64) -> Self {
        Self { id, success: true }
    }
}

// Auth types
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub is_guest: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_guest: bool,
}

// Deck types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeckRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckDetailResponse {
    pub deck: DbDeck,
    pub cards: Vec<DbFlashcard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub front: Option<String>,
    pub back: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReviewCardRequest {
    pub quality: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewCardResponse {
    pub success: bool,
    pub next_review_date: NaiveDate,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
}

// Quiz types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizDetailResponse {
    pub quiz: DbQuiz,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question_text: String,
    pub question_type: Option<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub explanation: Option<String>,
    pub points: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub answers: HashMap<String, String>,
    pub time_taken: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: i64,
    #[serde(flatten)]
    pub grade: QuizGrade,
}

// Pomodoro types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PomodoroSettingsRequest {
    pub focus_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub sessions_until_long_break: Option<u32>,
    pub auto_start_breaks: Option<bool>,
    pub auto_start_focus: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl PomodoroSettingsRequest {
    /// Missing fields take the default value
    pub fn into_settings(self) -> PomodoroSettings {
        let defaults = PomodoroSettings::default();
        PomodoroSettings {
            focus_duration: self.focus_duration.unwrap_or(defaults.focus_duration),
            short_break_duration: self
                .short_break_duration
                .unwrap_or(defaults.short_break_duration),
            long_break_duration: self
                .long_break_duration
                .unwrap_or(defaults.long_break_duration),
            sessions_until_long_break: self
                .sessions_until_long_break
                .unwrap_or(defaults.sessions_until_long_break),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(defaults.auto_start_breaks),
            auto_start_focus: self.auto_start_focus.unwrap_or(defaults.auto_start_focus),
            sound_enabled: self.sound_enabled.unwrap_or(defaults.sound_enabled),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogSessionRequest {
    pub session_type: Option<String>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogSessionResponse {
    pub success: bool,
    pub next_session: SessionType,
    pub next_duration_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<DbPomodoroSession>,
}

// Stats types
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyStatsResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counters: DailyCounters,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub today: DailyStatsResponse,
    pub deck_count: i64,
    pub quiz_count: i64,
    pub due_cards: i64,
}

// Syllabus types
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseSyllabusResponse {
    pub success: bool,
    pub content: String,
    pub length: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub content: String,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub target: GenerationTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuizSummary {
    pub id: i64,
    pub title: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDeckSummary {
    pub id: i64,
    pub name: String,
    pub card_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResults {
    pub quizzes: Vec<GeneratedQuizSummary>,
    pub flashcards: Vec<GeneratedDeckSummary>,
    pub study_plan: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub syllabus_id: i64,
    pub results: GenerationResults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyllabusListResponse {
    pub syllabi: Vec<Syllabus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_options_decode_to_empty() {
        let question = DbQuestion {
            id: 1,
            quiz_id: 1,
            question_text: "Q".to_string(),
            question_type: "multiple_choice".to_string(),
            correct_answer: "A".to_string(),
            options: "not json".to_string(),
            explanation: String::new(),
            points: 1,
            order_num: 1,
        };
        assert!(question.to_api_question().options.is_empty());
    }

    #[test]
    fn pomodoro_request_fills_defaults() {
        let request = PomodoroSettingsRequest {
            focus_duration: Some(50),
            ..Default::default()
        };
        let settings = request.into_settings();
        assert_eq!(settings.focus_duration, 50);
        assert_eq!(settings.short_break_duration, 5);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn undecodable_study_plan_is_none() {
        let syllabus = DbSyllabus {
            id: 1,
            user_id: 1,
            name: "Bio".to_string(),
            content: "cells".to_string(),
            study_plan: Some("{oops".to_string()),
            created_at: Utc::now(),
        };
        assert!(syllabus.to_api_syllabus().study_plan.is_none());
    }
}
