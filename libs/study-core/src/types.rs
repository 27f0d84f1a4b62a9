//! Core types shared by the scheduler and the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Lowest ease factor SM-2 will ever assign.
pub const MINIMUM_EASE: f64 = 1.3;

/// Ease factor given to a brand new card.
pub const INITIAL_EASE: f64 = 2.5;

/// Self-assessed recall quality for a review, 0 (blackout) to 5 (perfect).
///
/// - 0-1: complete failure
/// - 2: correct with serious difficulty
/// - 3: correct with hesitation
/// - 4: correct easily
/// - 5: perfect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ReviewQuality(u8);

impl ReviewQuality {
    pub const MAX: u8 = 5;

    /// Validate a raw quality score.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Scores below 3 count as a failed recall.
    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }
}

impl Default for ReviewQuality {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for ReviewQuality {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ReviewQuality> for u8 {
    fn from(quality: ReviewQuality) -> Self {
        quality.0
    }
}

/// Scheduling state stored alongside each flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchedule {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<NaiveDate>,
}

impl Default for CardSchedule {
    fn default() -> Self {
        Self {
            ease_factor: INITIAL_EASE,
            interval_days: 0,
            repetitions: 0,
            next_review_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_accepts_full_range() {
        for q in 0..=5 {
            assert_eq!(ReviewQuality::new(q).unwrap().value(), q as u8);
        }
    }

    #[test]
    fn quality_rejects_out_of_range() {
        assert_eq!(
            ReviewQuality::new(6),
            Err(ValidationError::InvalidQuality(6))
        );
        assert!(ReviewQuality::new(-1).is_err());
    }

    #[test]
    fn quality_deserializes_with_validation() {
        let q: ReviewQuality = serde_json::from_str("4").unwrap();
        assert_eq!(q.value(), 4);
        assert!(serde_json::from_str::<ReviewQuality>("9").is_err());
    }

    #[test]
    fn pass_threshold_is_three() {
        assert!(!ReviewQuality::new(2).unwrap().is_pass());
        assert!(ReviewQuality::new(3).unwrap().is_pass());
    }
}
