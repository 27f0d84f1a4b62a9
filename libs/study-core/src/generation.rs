//! Prompt construction and best-effort parsing of language-model output.
//!
//! Models are asked for bare JSON but frequently wrap it in a markdown code
//! fence, return numbers where strings were requested, or produce nothing
//! parseable at all. Parsing here never fails loudly: callers get `None` and
//! skip the stage.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::quiz::QuestionType;

/// Characters of extracted source text kept after ingestion.
pub const MAX_SOURCE_CHARS: usize = 15_000;

/// Characters of source text stored on the syllabus record.
pub const MAX_STORED_CHARS: usize = 5_000;

pub const MAX_QUIZ_QUESTIONS: usize = 10;
pub const MAX_FLASHCARDS: usize = 15;

/// One of the three generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Quiz,
    Flashcards,
    StudyPlan,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Quiz, Stage::Flashcards, Stage::StudyPlan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
            Self::StudyPlan => "study_plan",
        }
    }

    /// How much source text the prompt embeds.
    pub fn content_limit(&self) -> usize {
        match self {
            Self::Quiz | Self::Flashcards => 8_000,
            Self::StudyPlan => 6_000,
        }
    }

    /// Completion budget requested from the model.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Quiz => 3_000,
            Self::Flashcards => 2_000,
            Self::StudyPlan => 1_500,
        }
    }

    /// Full user prompt for this stage.
    pub fn prompt(&self, content: &str) -> String {
        let content = truncate_chars(content, self.content_limit());
        match self {
            Self::Quiz => format!(
                r#"Based on this syllabus/course content, generate {MAX_QUIZ_QUESTIONS} quiz questions.

SYLLABUS CONTENT:
{content}

Return ONLY a valid JSON array with this exact format (no markdown, no explanation):
[
  {{
    "question": "What is...?",
    "type": "multiple_choice",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correct_answer": "Option A",
    "explanation": "Brief explanation why this is correct"
  }}
]

Include a mix of multiple_choice and true_false questions. For true_false, options should be ["True", "False"]."#
            ),
            Self::Flashcards => format!(
                r#"Based on this syllabus/course content, generate {MAX_FLASHCARDS} flashcards for key terms and concepts.

SYLLABUS CONTENT:
{content}

Return ONLY a valid JSON array with this exact format (no markdown, no explanation):
[
  {{
    "front": "Term or question",
    "back": "Definition or answer"
  }}
]"#
            ),
            Self::StudyPlan => format!(
                r#"Based on this syllabus, create a study plan with topics and recommended Pomodoro sessions.

SYLLABUS CONTENT:
{content}

Return ONLY a valid JSON object with this format (no markdown):
{{
  "topics": [
    {{
      "name": "Topic Name",
      "description": "Brief description",
      "estimated_pomodoros": 4,
      "priority": "high"
    }}
  ],
  "total_study_hours": 20,
  "recommended_daily_pomodoros": 4
}}"#
            ),
        }
    }
}

/// Which stages a generation request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTarget {
    Quizzes,
    Flashcards,
    Plan,
    All,
}

impl Default for GenerationTarget {
    fn default() -> Self {
        Self::All
    }
}

impl GenerationTarget {
    pub fn includes(&self, stage: Stage) -> bool {
        matches!(
            (self, stage),
            (Self::All, _)
                | (Self::Quizzes, Stage::Quiz)
                | (Self::Flashcards, Stage::Flashcards)
                | (Self::Plan, Stage::StudyPlan)
        )
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(move |s| self.includes(*s))
    }
}

/// A quiz question as emitted by the model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratedQuestion {
    #[serde(deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub question_type: String,
    pub options: Vec<Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub correct_answer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub explanation: String,
}

impl GeneratedQuestion {
    pub fn kind(&self) -> QuestionType {
        QuestionType::from_generated(&self.question_type)
    }

    /// Options rendered as strings, whatever JSON type the model used.
    pub fn option_strings(&self) -> Vec<String> {
        self.options.iter().map(value_to_string).collect()
    }
}

/// A flashcard as emitted by the model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratedCard {
    #[serde(deserialize_with = "lenient_string")]
    pub front: String,
    #[serde(deserialize_with = "lenient_string")]
    pub back: String,
}

/// Remove a surrounding markdown code fence (with or without a `json` tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = rest.split("```").next().unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Parse a quiz response. Returns at most [`MAX_QUIZ_QUESTIONS`] questions.
pub fn parse_quiz(raw: &str) -> Option<Vec<GeneratedQuestion>> {
    let mut questions: Vec<GeneratedQuestion> = serde_json::from_str(strip_code_fence(raw)).ok()?;
    questions.truncate(MAX_QUIZ_QUESTIONS);
    Some(questions)
}

/// Parse a flashcard response. Returns at most [`MAX_FLASHCARDS`] cards.
pub fn parse_flashcards(raw: &str) -> Option<Vec<GeneratedCard>> {
    let mut cards: Vec<GeneratedCard> = serde_json::from_str(strip_code_fence(raw)).ok()?;
    cards.truncate(MAX_FLASHCARDS);
    Some(cards)
}

/// Parse a study plan response. Any valid JSON is accepted as-is.
pub fn parse_study_plan(raw: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fence(raw)).ok()
}

/// Prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}
