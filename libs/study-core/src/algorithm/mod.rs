//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::types::{CardSchedule, ReviewQuality};
use chrono::NaiveDate;

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: CardSchedule,
    pub next_review_date: NaiveDate,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate next review state after a review on `today`.
    fn schedule(
        &self,
        state: &CardSchedule,
        quality: ReviewQuality,
        today: NaiveDate,
    ) -> SchedulingResult;

    /// Initial state for a new card.
    fn initial_state(&self) -> CardSchedule;
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SpacedRepetitionAlgorithm>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
