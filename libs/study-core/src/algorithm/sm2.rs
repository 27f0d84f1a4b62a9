//! SM-2 spaced repetition algorithm.
//!
//! Classic SuperMemo 2: a 0-5 quality score drives the repetition count,
//! the inter-review interval and a per-card ease factor.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{CardSchedule, ReviewQuality, INITIAL_EASE, MINIMUM_EASE};
use chrono::{Days, NaiveDate};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful repetition.
    pub first_interval: u32,
    /// Interval after the second successful repetition.
    pub second_interval: u32,
    /// Upper bound on any interval, in days.
    pub maximum_interval: u32,
}

/// About a hundred years.
pub const MAXIMUM_INTERVAL_DAYS: u32 = 36_500;

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE,
            minimum_ease: MINIMUM_EASE,
            first_interval: 1,
            second_interval: 6,
            maximum_interval: MAXIMUM_INTERVAL_DAYS,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self) -> CardSchedule {
        CardSchedule {
            ease_factor: self.initial_ease,
            interval_days: 0,
            repetitions: 0,
            next_review_date: None,
        }
    }

    fn schedule(
        &self,
        state: &CardSchedule,
        quality: ReviewQuality,
        today: NaiveDate,
    ) -> SchedulingResult {
        let (interval, repetitions) = if quality.is_pass() {
            let interval = match state.repetitions {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => self.grow_interval(state.interval_days, state.ease_factor),
            };
            (interval, state.repetitions + 1)
        } else {
            // Lapse: start the repetition sequence over
            (self.first_interval, 0)
        };

        let ease_factor = self.adjust_ease(state.ease_factor, quality);
        let next_review_date = today
            .checked_add_days(Days::new(u64::from(interval)))
            .unwrap_or(NaiveDate::MAX);

        SchedulingResult {
            new_state: CardSchedule {
                ease_factor,
                interval_days: interval,
                repetitions,
                next_review_date: Some(next_review_date),
            },
            next_review_date,
        }
    }
}

impl Sm2 {
    /// Multiply the previous interval by the pre-review ease factor, truncating.
    /// Clamped to `[first_interval, maximum_interval]`.
    fn grow_interval(&self, interval_days: u32, ease_factor: f64) -> u32 {
        let grown = (f64::from(interval_days) * ease_factor).floor();
        (grown as u32)
            .min(self.maximum_interval)
            .max(self.first_interval)
    }

    /// EF' = EF + 0.1 - (5 - q) * (0.08 + (5 - q) * 0.02), floored at the minimum.
    fn adjust_ease(&self, ease_factor: f64, quality: ReviewQuality) -> f64 {
        let miss = f64::from(ReviewQuality::MAX - quality.value());
        let adjusted = ease_factor + 0.1 - miss * (0.08 + miss * 0.02);
        adjusted.max(self.minimum_ease)
    }
}
