//! Syllabus-to-study-material pipeline.
//!
//! The syllabus row is written first. Each stage then asks the model for JSON,
//! parses it leniently and commits its own records, so a later stage failing
//! never rolls back an earlier one.

use chrono::NaiveDate;
use study_core::generation::{
    parse_flashcards, parse_quiz, parse_study_plan, truncate_chars, GenerationTarget, Stage,
    MAX_STORED_CHARS,
};

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{GeneratedDeckSummary, GeneratedQuizSummary, GenerationResults, NewQuestion};
use crate::services::llm::{CompletionClient, CompletionRequest, LlmError};

pub const DEFAULT_SYLLABUS_NAME: &str = "My Syllabus";

const GENERATED_DESCRIPTION: &str = "Auto-generated from syllabus";

/// Outcome of a generation run
#[derive(Debug)]
pub struct Generated {
    pub syllabus_id: i64,
    pub results: GenerationResults,
}

pub struct GenerationPipeline<'a> {
    db: &'a Database,
    llm: &'a dyn CompletionClient,
    today: NaiveDate,
}

impl<'a> GenerationPipeline<'a> {
    pub fn new(db: &'a Database, llm: &'a dyn CompletionClient, today: NaiveDate) -> Self {
        Self { db, llm, today }
    }

    pub async fn run(
        &self,
        user_id: i64,
        name: Option<&str>,
        content: &str,
        target: GenerationTarget,
    ) -> Result<Generated> {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest("No content provided".to_string()));
        }
        if !self.llm.is_available() {
            return Err(LlmError::NotConfigured.into());
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SYLLABUS_NAME);

        let syllabus_id = self
            .db
            .create_syllabus(user_id, name, truncate_chars(content, MAX_STORED_CHARS))
            .await?;
        tracing::info!(syllabus_id, ?target, "generating study material");

        let mut results = GenerationResults::default();
        for stage in target.stages() {
            let raw = self.complete(stage, content).await?;
            match stage {
                Stage::Quiz => {
                    if let Some(quiz) = self.save_quiz(user_id, name, &raw).await? {
                        results.quizzes.push(quiz);
                    }
                }
                Stage::Flashcards => {
                    if let Some(deck) = self.save_deck(user_id, name, &raw).await? {
                        results.flashcards.push(deck);
                    }
                }
                Stage::StudyPlan => {
                    results.study_plan = self.save_study_plan(syllabus_id, &raw).await?;
                }
            }
        }

        Ok(Generated {
            syllabus_id,
            results,
        })
    }

    async fn complete(&self, stage: Stage, content: &str) -> Result<String> {
        let request = CompletionRequest {
            prompt: stage.prompt(content),
            max_tokens: stage.max_tokens(),
        };
        self.llm.complete(&request).await.map_err(|e| {
            tracing::error!(stage = stage.as_str(), error = %e, "model call failed");
            ApiError::from(e)
        })
    }

    async fn save_quiz(
        &self,
        user_id: i64,
        name: &str,
        raw: &str,
    ) -> Result<Option<GeneratedQuizSummary>> {
        let Some(generated) = parse_quiz(raw) else {
            tracing::warn!(stage = Stage::Quiz.as_str(), "unparseable model output, skipping");
            return Ok(None);
        };

        let questions: Vec<NewQuestion> = generated
            .iter()
            .map(|q| NewQuestion {
                question_text: q.question.clone(),
                question_type: q.kind(),
                correct_answer: q.correct_answer.clone(),
                options: q.option_strings(),
                explanation: q.explanation.clone(),
                points: 1,
            })
            .collect();

        let title = format!("{name} - Quiz");
        let id = self
            .db
            .create_quiz_with_questions(user_id, &title, GENERATED_DESCRIPTION, name, &questions)
            .await?;
        tracing::info!(quiz_id = id, questions = questions.len(), "saved generated quiz");

        Ok(Some(GeneratedQuizSummary {
            id,
            title,
            question_count: questions.len(),
        }))
    }

    async fn save_deck(
        &self,
        user_id: i64,
        name: &str,
        raw: &str,
    ) -> Result<Option<GeneratedDeckSummary>> {
        let Some(generated) = parse_flashcards(raw) else {
            tracing::warn!(stage = Stage::Flashcards.as_str(), "unparseable model output, skipping");
            return Ok(None);
        };

        let cards: Vec<(String, String)> = generated
            .into_iter()
            .map(|card| (card.front, card.back))
            .collect();

        let deck_name = format!("{name} - Flashcards");
        let id = self
            .db
            .create_deck_with_cards(
                user_id,
                &deck_name,
                GENERATED_DESCRIPTION,
                name,
                &cards,
                self.today,
            )
            .await?;
        tracing::info!(deck_id = id, cards = cards.len(), "saved generated deck");

        Ok(Some(GeneratedDeckSummary {
            id,
            name: deck_name,
            card_count: cards.len(),
        }))
    }

    async fn save_study_plan(
        &self,
        syllabus_id: i64,
        raw: &str,
    ) -> Result<Option<serde_json::Value>> {
        let Some(plan) = parse_study_plan(raw) else {
            tracing::warn!(stage = Stage::StudyPlan.as_str(), "unparseable model output, skipping");
            return Ok(None);
        };

        self.db.set_study_plan(syllabus_id, &plan.to_string()).await?;
        tracing::info!(syllabus_id, "saved study plan");
        Ok(Some(plan))
    }
}
