//! Per-day study counters.

use serde::{Deserialize, Serialize};

/// Aggregate activity for one user on one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyCounters {
    pub pomodoro_count: i64,
    pub focus_minutes: i64,
    pub cards_reviewed: i64,
    pub quizzes_taken: i64,
    pub average_quiz_score: f64,
}

impl DailyCounters {
    /// Count a completed session. Only focus sessions move the counters.
    pub fn record_focus(&mut self, minutes: i64) {
        self.pomodoro_count += 1;
        self.focus_minutes += minutes;
    }

    pub fn record_card_review(&mut self) {
        self.cards_reviewed += 1;
    }

    /// Fold a quiz percentage into the running average.
    pub fn record_quiz(&mut self, percentage: f64) {
        let taken = self.quizzes_taken as f64;
        self.average_quiz_score = (self.average_quiz_score * taken + percentage) / (taken + 1.0);
        self.quizzes_taken += 1;
    }
}
