use quiz_core::model::{Identity, Item, PoolSelector, Prompt, QuizKind, QuizResult, ResultId};
use quiz_core::{Answer, QuizSession, SessionProgress};

use crate::config::QuizSettings;
use crate::error::{PersistFailure, QuizServiceError};

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// What to quiz on: which kind of quiz, over which pool, in which shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRequest {
    pub kind: QuizKind,
    pub pool: PoolSelector,
    /// `None` uses the service's configured settings for `pool`.
    pub settings: Option<QuizSettings>,
}

impl QuizRequest {
    #[must_use]
    pub fn new(kind: QuizKind, pool: PoolSelector) -> Self {
        Self {
            kind,
            pool,
            settings: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

//
// ─── ACTIVE QUIZ ───────────────────────────────────────────────────────────────
//

/// A running quiz bound to the learner who started it.
///
/// Answering and going back are synchronous; moving forward goes through
/// [`crate::QuizService::advance`] because completion persists the result.
#[derive(Debug)]
pub struct ActiveQuiz {
    pub(crate) session: QuizSession,
    pub(crate) identity: Identity,
}

impl ActiveQuiz {
    pub(crate) fn new(session: QuizSession, identity: Identity) -> Self {
        Self { session, identity }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn kind(&self) -> QuizKind {
        self.session.kind()
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.session.current_index()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Prompt> {
        self.session.current_question()
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.session.answer(index)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Protocol` for out-of-turn answers, unknown
    /// options, match questions or a completed quiz.
    pub fn select_answer(
        &mut self,
        index: usize,
        chosen: &Item,
    ) -> Result<&Answer, QuizServiceError> {
        Ok(self.session.select_answer(index, chosen)?)
    }

    /// Answer a true/false question.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Protocol` for out-of-turn answers,
    /// multiple-choice questions or a completed quiz.
    pub fn claim_match(
        &mut self,
        index: usize,
        claims_match: bool,
    ) -> Result<&Answer, QuizServiceError> {
        Ok(self.session.claim_match(index, claims_match)?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Protocol` at the first question or after
    /// completion.
    pub fn retreat(&mut self) -> Result<usize, QuizServiceError> {
        Ok(self.session.retreat()?)
    }
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// The finished quiz. `persisted` is the outcome of writing `result` to the
/// result sink; a failure there does not take the result away.
#[derive(Debug)]
pub struct QuizCompletion {
    pub result: QuizResult,
    pub persisted: Result<ResultId, PersistFailure>,
}

impl QuizCompletion {
    #[must_use]
    pub fn result_id(&self) -> Option<ResultId> {
        self.persisted.as_ref().ok().copied()
    }

    #[must_use]
    pub fn persist_failure(&self) -> Option<&PersistFailure> {
        self.persisted.as_ref().err()
    }
}

/// Outcome of [`crate::QuizService::advance`].
#[derive(Debug)]
pub enum AdvanceOutcome {
    Next(usize),
    Completed(QuizCompletion),
}
