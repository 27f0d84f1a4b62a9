//! Test fixtures and factory functions for request bodies.

use serde_json::json;

/// Fenced quiz reply: one true/false question and one with an unsupported type.
pub const QUIZ_REPLY: &str = r#"```json
[
  {
    "question": "The mitochondria is the powerhouse of the cell.",
    "type": "true_false",
    "options": ["True", "False"],
    "correct_answer": "True",
    "explanation": "It produces ATP."
  },
  {
    "question": "Which organelle holds DNA?",
    "type": "matching",
    "options": ["Nucleus", "Ribosome", "Golgi", "Vacuole"],
    "correct_answer": "Nucleus"
  }
]
```"#;

pub const FLASHCARDS_REPLY: &str = r#"[
  {"front": "Osmosis", "back": "Diffusion of water across a membrane"},
  {"front": "ATP", "back": "Energy currency of the cell"},
  {"front": "Ribosome", "back": "Site of protein synthesis"}
]"#;

pub const STUDY_PLAN_REPLY: &str = r#"{
  "topics": [
    {"name": "Cell structure", "description": "Organelles", "estimated_pomodoros": 4, "priority": "high"}
  ],
  "total_study_hours": 12,
  "recommended_daily_pomodoros": 4
}"#;

pub const SAMPLE_SYLLABUS: &str = "Biology 101\nWeek 1: Cell structure\nWeek 2: Membranes and transport";

pub fn signup_request(username: &str, password: &str, confirm: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": password,
        "confirm_password": confirm
    })
}

pub fn login_request(username: &str, password: &str) -> serde_json::Value {
    json!({ "username": username, "password": password })
}

pub fn deck_request(name: &str, subject: &str) -> serde_json::Value {
    json!({ "name": name, "description": "", "subject": subject })
}

pub fn card_request(front: &str, back: &str) -> serde_json::Value {
    json!({ "front": front, "back": back })
}

pub fn review_request(quality: i64) -> serde_json::Value {
    json!({ "quality": quality })
}

pub fn quiz_request(title: &str) -> serde_json::Value {
    json!({ "title": title, "description": "Practice", "subject": "Science" })
}

pub fn question_request(text: &str, correct: &str, points: i64) -> serde_json::Value {
    json!({
        "question_text": text,
        "question_type": "multiple_choice",
        "correct_answer": correct,
        "options": [correct, "Something else"],
        "points": points
    })
}

pub fn session_request(session_type: &str, minutes: i64) -> serde_json::Value {
    json!({ "session_type": session_type, "duration_minutes": minutes, "notes": "" })
}

pub fn generate_request(content: &str, name: &str, target: &str) -> serde_json::Value {
    json!({ "content": content, "name": name, "type": target })
}
