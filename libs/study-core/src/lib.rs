//! Core study library shared by the backend service.
//!
//! Provides:
//! - SM-2 spaced repetition scheduling
//! - Pomodoro session cycling and settings validation
//! - Quiz grading
//! - Daily stat counters
//! - Prompt construction and parsing for syllabus-driven generation

pub mod algorithm;
pub mod error;
pub mod generation;
pub mod pomodoro;
pub mod quiz;
pub mod stats;
pub mod types;

pub use algorithm::{get_algorithm, SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{Result, ValidationError};
pub use generation::{GeneratedCard, GeneratedQuestion, GenerationTarget, Stage};
pub use pomodoro::{PomodoroSettings, SessionType};
pub use quiz::{grade, AnswerKey, QuestionResult, QuestionType, QuizGrade};
pub use stats::DailyCounters;
pub use types::{CardSchedule, ReviewQuality, INITIAL_EASE, MINIMUM_EASE};
