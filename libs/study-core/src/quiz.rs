//! Quiz question types and grading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Question format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::MultipleChoice
    }
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "short_answer" => Ok(Self::ShortAnswer),
            other => Err(ValidationError::UnknownQuestionType(other.to_string())),
        }
    }

    /// Generated questions are either true/false or treated as multiple choice.
    pub fn from_generated(s: &str) -> Self {
        if s == "true_false" {
            Self::TrueFalse
        } else {
            Self::MultipleChoice
        }
    }
}

/// The grading-relevant part of a stored question.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    pub question_id: i64,
    pub correct_answer: String,
    pub explanation: String,
    pub points: i64,
}

/// Outcome for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
}

/// Outcome for a whole submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizGrade {
    pub score: i64,
    pub total_points: i64,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
}

/// Compare answers ignoring surrounding whitespace and case.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Grade a submission. `answers` is keyed by the question id rendered as a
/// string; unanswered questions count as wrong.
pub fn grade(keys: &[AnswerKey], answers: &HashMap<String, String>) -> QuizGrade {
    let mut score = 0;
    let mut total_points = 0;
    let mut results = Vec::with_capacity(keys.len());

    for key in keys {
        total_points += key.points;
        let user_answer = answers
            .get(&key.question_id.to_string())
            .cloned()
            .unwrap_or_default();
        let correct = answers_match(&user_answer, &key.correct_answer);
        if correct {
            score += key.points;
        }
        results.push(QuestionResult {
            question_id: key.question_id,
            correct,
            user_answer,
            correct_answer: key.correct_answer.clone(),
            explanation: key.explanation.clone(),
        });
    }

    let percentage = if total_points > 0 {
        score as f64 / total_points as f64 * 100.0
    } else {
        0.0
    };

    QuizGrade {
        score,
        total_points,
        percentage,
        results,
    }
}
