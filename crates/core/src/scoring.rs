use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FeedbackTier;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringPolicyError {
    #[error("points per correct answer must be positive")]
    ZeroPoints,

    #[error("tier thresholds must be at most 100 and strictly descending, got {excellent}/{good}/{fair}")]
    InvalidThresholds { excellent: u8, good: u8, fair: u8 },
}

/// Points awarded per correct answer and the percentage cut-offs of the
/// four feedback tiers.
///
/// A ratio `score / total` at or above `excellent_percent` is
/// [`FeedbackTier::Excellent`], at or above `good_percent` is
/// [`FeedbackTier::Good`], at or above `fair_percent` is
/// [`FeedbackTier::NeedsWork`], anything lower is
/// [`FeedbackTier::KeepPracticing`].
///
/// # Examples
///
/// ```
/// # use quiz_core::ScoringPolicy;
/// # use quiz_core::model::FeedbackTier;
/// let policy = ScoringPolicy::default();
/// assert_eq!(policy.total_for(5), 50);
/// assert_eq!(policy.feedback_tier(40, 50), FeedbackTier::Excellent);
/// assert_eq!(policy.feedback_tier(10, 50), FeedbackTier::KeepPracticing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub points_per_correct: u32,
    pub excellent_percent: u8,
    pub good_percent: u8,
    pub fair_percent: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            points_per_correct: 10,
            excellent_percent: 80,
            good_percent: 60,
            fair_percent: 30,
        }
    }
}

impl ScoringPolicy {
    /// # Errors
    ///
    /// Returns `ScoringPolicyError` if points are zero or the thresholds are
    /// not strictly descending within `0..=100`.
    pub fn validate(self) -> Result<Self, ScoringPolicyError> {
        if self.points_per_correct == 0 {
            return Err(ScoringPolicyError::ZeroPoints);
        }
        let ordered = self.excellent_percent <= 100
            && self.excellent_percent > self.good_percent
            && self.good_percent > self.fair_percent;
        if !ordered {
            return Err(ScoringPolicyError::InvalidThresholds {
                excellent: self.excellent_percent,
                good: self.good_percent,
                fair: self.fair_percent,
            });
        }
        Ok(self)
    }

    /// Maximum attainable score for a session of `question_count` questions.
    #[must_use]
    pub fn total_for(&self, question_count: usize) -> u32 {
        u32::try_from(question_count)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.points_per_correct)
    }

    /// Map a score ratio onto one of the four tiers.
    #[must_use]
    pub fn feedback_tier(&self, score: u32, total: u32) -> FeedbackTier {
        if total == 0 {
            return FeedbackTier::KeepPracticing;
        }
        let scaled = u64::from(score) * 100;
        let at_least = |pct: u8| scaled >= u64::from(pct) * u64::from(total);

        if at_least(self.excellent_percent) {
            FeedbackTier::Excellent
        } else if at_least(self.good_percent) {
            FeedbackTier::Good
        } else if at_least(self.fair_percent) {
            FeedbackTier::NeedsWork
        } else {
            FeedbackTier::KeepPracticing
        }
    }
}
