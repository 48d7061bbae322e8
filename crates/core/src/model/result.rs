use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionFormat;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("result total must be positive")]
    ZeroTotal,

    #[error("score ({score}) exceeds total ({total})")]
    ScoreAboveTotal { score: u32, total: u32 },

    #[error("unknown {field} value: {raw}")]
    UnknownCode { field: &'static str, raw: String },
}

//
// ─── SELECTORS ─────────────────────────────────────────────────────────────────
//

/// Which item collection a session draws from. Persisted as the result `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSelector {
    /// Items the learner recognized with the camera and saved to their library.
    Personal,
    /// The shared pool every learner can practice with.
    General,
}

impl PoolSelector {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PoolSelector::Personal => "personal",
            PoolSelector::General => "general",
        }
    }
}

/// Where a result is filed: quizzes are exams, the rest are games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Exam,
    Game,
}

impl ResultCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCategory::Exam => "exam",
            ResultCategory::Game => "game",
        }
    }
}

/// The quiz and game variants the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    /// Picture shown, pick the matching word.
    TextChoice,
    /// Word shown, pick the matching picture.
    ImageChoice,
    /// Word spoken aloud, pick the matching picture.
    AudioGuess,
    /// Picture shown with a spoken label, say whether they match.
    TrueFalse,
}

impl QuizKind {
    pub const ALL: [QuizKind; 4] = [
        QuizKind::TextChoice,
        QuizKind::ImageChoice,
        QuizKind::AudioGuess,
        QuizKind::TrueFalse,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::TextChoice => "text_choice",
            QuizKind::ImageChoice => "image_choice",
            QuizKind::AudioGuess => "audio_guess",
            QuizKind::TrueFalse => "true_false",
        }
    }

    #[must_use]
    pub fn category(self) -> ResultCategory {
        match self {
            QuizKind::TextChoice | QuizKind::ImageChoice => ResultCategory::Exam,
            QuizKind::AudioGuess | QuizKind::TrueFalse => ResultCategory::Game,
        }
    }

    #[must_use]
    pub fn format(self) -> QuestionFormat {
        match self {
            QuizKind::TrueFalse => QuestionFormat::Match,
            _ => QuestionFormat::Choice,
        }
    }
}

/// Coarse qualitative bucket for a finished session, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    NeedsWork,
    KeepPracticing,
}

impl FeedbackTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::NeedsWork => "needs_work",
            FeedbackTier::KeepPracticing => "keep_practicing",
        }
    }

    /// Short message shown on the result screen.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent performance!",
            FeedbackTier::Good => "Well done!",
            FeedbackTier::NeedsWork => "You need a bit more practice.",
            FeedbackTier::KeepPracticing => "Keep studying, you will get there.",
        }
    }
}

macro_rules! impl_code {
    ($ty:ident, $field:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = QuizResultError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(QuizResultError::UnknownCode {
                    field: $field,
                    raw: s.to_owned(),
                })
            }
        }
    };
}

impl_code!(PoolSelector, "mode", [Personal, General]);
impl_code!(ResultCategory, "category", [Exam, Game]);
impl_code!(QuizKind, "kind", [TextChoice, ImageChoice, AudioGuess, TrueFalse]);
impl_code!(FeedbackTier, "feedback", [Excellent, Good, NeedsWork, KeepPracticing]);

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Immutable summary of one completed session, handed to the result sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    kind: QuizKind,
    mode: PoolSelector,
    score: u32,
    total: u32,
    feedback: FeedbackTier,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Rehydrate a result (from storage or from the session scorer).
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if `total` is zero or `score` exceeds it.
    pub fn from_persisted(
        kind: QuizKind,
        mode: PoolSelector,
        score: u32,
        total: u32,
        feedback: FeedbackTier,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if total == 0 {
            return Err(QuizResultError::ZeroTotal);
        }
        if score > total {
            return Err(QuizResultError::ScoreAboveTotal { score, total });
        }
        Ok(Self {
            kind,
            mode,
            score,
            total,
            feedback,
            completed_at,
        })
    }

    /// Result of a session that just finished. The session guarantees a
    /// positive total and a score within it.
    pub(crate) fn scored(
        kind: QuizKind,
        mode: PoolSelector,
        score: u32,
        total: u32,
        feedback: FeedbackTier,
        completed_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(total > 0 && score <= total);
        Self {
            kind,
            mode,
            score,
            total,
            feedback,
            completed_at,
        }
    }

    #[must_use]
    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    #[must_use]
    pub fn mode(&self) -> PoolSelector {
        self.mode
    }

    #[must_use]
    pub fn category(&self) -> ResultCategory {
        self.kind.category()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn feedback(&self) -> FeedbackTier {
        self.feedback
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Score as a whole percentage of the total, rounded down.
    #[must_use]
    pub fn percent(&self) -> u32 {
        let pct = u64::from(self.score) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(100)
    }
}
