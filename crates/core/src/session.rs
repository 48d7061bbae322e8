use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{Item, Label, PoolSelector, Prompt, QuestionFormat, QuizKind, QuizResult};
use crate::scoring::{ScoringPolicy, ScoringPolicyError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Why a session could not be started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSetupError {
    #[error("a session needs at least one question")]
    NoQuestions,

    #[error("question {index} does not fit a {kind} session")]
    FormatMismatch { index: usize, kind: QuizKind },

    #[error(transparent)]
    Scoring(#[from] ScoringPolicyError),
}

/// A call the session state machine does not allow in its current state.
///
/// These are caller bugs: a screen should never offer the action that
/// produced them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolViolation {
    #[error("answer for question {index} given while question {current} is active")]
    OutOfTurn { index: usize, current: usize },

    #[error("question {index} must be answered before advancing")]
    Unanswered { index: usize },

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("session already completed")]
    Completed,

    #[error("`{label}` is not one of the options for question {index}")]
    UnknownOption { index: usize, label: Label },

    #[error("question {index} is answered with a {expected:?} response")]
    WrongFormat {
        index: usize,
        expected: QuestionFormat,
    },
}

//
// ─── ANSWERS & PROGRESS ────────────────────────────────────────────────────────
//

/// What the learner said for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// An option of a multiple-choice question.
    Picked(Item),
    /// "Matches" (`true`) or "does not match" (`false`).
    Claimed(bool),
}

/// The response recorded for one question. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub response: Response,
    pub is_correct: bool,
}

/// Outcome of [`QuizSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// The last question was left; the session is over.
    Completed(QuizResult),
}

/// Snapshot of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub current_index: usize,
    pub score: u32,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    InProgress(usize),
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Position, answers and score of one run through a generated question set.
///
/// The question list is fixed at construction. Navigation forward requires the
/// current question to be answered; navigation backward never reopens an
/// answer. Leaving the last question completes the session and yields its
/// [`QuizResult`] exactly once.
pub struct QuizSession {
    kind: QuizKind,
    mode: PoolSelector,
    policy: ScoringPolicy,
    questions: Vec<Prompt>,
    answers: Vec<Option<Answer>>,
    phase: Phase,
    score: u32,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// # Errors
    ///
    /// - `NoQuestions` if `questions` is empty
    /// - `FormatMismatch` if a question is not in `kind`'s format
    /// - `Scoring` if `policy` does not validate
    pub fn new(
        kind: QuizKind,
        mode: PoolSelector,
        questions: Vec<Prompt>,
        policy: ScoringPolicy,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionSetupError> {
        let policy = policy.validate()?;
        if questions.is_empty() {
            return Err(SessionSetupError::NoQuestions);
        }
        if let Some(index) = questions.iter().position(|q| q.format() != kind.format()) {
            return Err(SessionSetupError::FormatMismatch { index, kind });
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            kind,
            mode,
            policy,
            questions,
            answers,
            phase: Phase::InProgress(0),
            score: 0,
            started_at,
        })
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
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Prompt] {
        &self.questions
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score this session can reach.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.policy.total_for(self.questions.len())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Index of the active question, `None` once completed.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::InProgress(i) => Some(i),
            Phase::Completed => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Prompt> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
            current_index: self.current_index().unwrap_or(self.questions.len()),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    /// Record `chosen` as the answer to multiple-choice question `index`.
    ///
    /// Re-answering a question is a no-op that returns the first answer.
    ///
    /// # Errors
    ///
    /// - `Completed` if the session is over
    /// - `OutOfTurn` if `index` is not the active question
    /// - `WrongFormat` if the question is a match question
    /// - `UnknownOption` if `chosen` is not among the question's options
    pub fn select_answer(&mut self, index: usize, chosen: &Item) -> Result<&Answer, ProtocolViolation> {
        self.record(index, |question| {
            let Prompt::Choice(question) = question else {
                return Err(ProtocolViolation::WrongFormat {
                    index,
                    expected: QuestionFormat::Match,
                });
            };
            if !question.has_option(chosen) {
                return Err(ProtocolViolation::UnknownOption {
                    index,
                    label: chosen.label().clone(),
                });
            }
            Ok(Answer {
                is_correct: question.is_correct(chosen),
                response: Response::Picked(chosen.clone()),
            })
        })
    }

    /// Record whether the learner says the shown label of match question
    /// `index` belongs to its subject.
    ///
    /// Re-answering a question is a no-op that returns the first answer.
    ///
    /// # Errors
    ///
    /// - `Completed` if the session is over
    /// - `OutOfTurn` if `index` is not the active question
    /// - `WrongFormat` if the question is a multiple-choice question
    pub fn claim_match(&mut self, index: usize, claims_match: bool) -> Result<&Answer, ProtocolViolation> {
        self.record(index, |question| {
            let Prompt::Match(question) = question else {
                return Err(ProtocolViolation::WrongFormat {
                    index,
                    expected: QuestionFormat::Choice,
                });
            };
            Ok(Answer {
                is_correct: question.is_correct(claims_match),
                response: Response::Claimed(claims_match),
            })
        })
    }

    fn record(
        &mut self,
        index: usize,
        judge: impl FnOnce(&Prompt) -> Result<Answer, ProtocolViolation>,
    ) -> Result<&Answer, ProtocolViolation> {
        let current = self.active_index()?;
        if index != current {
            return Err(ProtocolViolation::OutOfTurn { index, current });
        }

        if self.answers[index].is_none() {
            let answer = judge(&self.questions[index])?;
            if answer.is_correct {
                self.score = self.score.saturating_add(self.policy.points_per_correct);
            }
            self.answers[index] = Some(answer);
        }

        self.answers[index]
            .as_ref()
            .ok_or(ProtocolViolation::Unanswered { index })
    }

    /// Move past the active question, completing the session after the last one.
    ///
    /// # Errors
    ///
    /// - `Completed` if the session is over
    /// - `Unanswered` if the active question has no answer yet
    pub fn advance(&mut self, completed_at: DateTime<Utc>) -> Result<Advance, ProtocolViolation> {
        let current = self.active_index()?;
        if self.answers[current].is_none() {
            return Err(ProtocolViolation::Unanswered { index: current });
        }

        let next = current + 1;
        if next < self.questions.len() {
            self.phase = Phase::InProgress(next);
            return Ok(Advance::Next(next));
        }

        let total = self.total();
        let result = QuizResult::scored(
            self.kind,
            self.mode,
            self.score,
            total,
            self.policy.feedback_tier(self.score, total),
            completed_at,
        );
        self.phase = Phase::Completed;
        Ok(Advance::Completed(result))
    }

    /// Step back to the previous question. Its answer stays as recorded.
    ///
    /// # Errors
    ///
    /// - `Completed` if the session is over
    /// - `AtFirstQuestion` if the first question is active
    pub fn retreat(&mut self) -> Result<usize, ProtocolViolation> {
        let current = self.active_index()?;
        if current == 0 {
            return Err(ProtocolViolation::AtFirstQuestion);
        }
        self.phase = Phase::InProgress(current - 1);
        Ok(current - 1)
    }

    fn active_index(&self) -> Result<usize, ProtocolViolation> {
        self.current_index().ok_or(ProtocolViolation::Completed)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .field("questions_len", &self.questions.len())
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::QuestionGenerator;
    use crate::model::{FeedbackTier, ItemPool};
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool_of(size: usize) -> ItemPool {
        ItemPool::from_items((0..size).map(|i| {
            Item::parse(format!("word-{i}"), format!("img-{i}.png")).unwrap()
        }))
    }

    fn session_for(kind: QuizKind, pool_size: usize, count: usize) -> QuizSession {
        let questions = QuestionGenerator::new(count, 3)
            .generate_for(kind, &pool_of(pool_size), &mut StdRng::seed_from_u64(11))
            .unwrap();
        QuizSession::new(
            kind,
            PoolSelector::Personal,
            questions,
            ScoringPolicy::default(),
            fixed_now(),
        )
        .unwrap()
    }

    fn session_of(pool_size: usize, count: usize) -> QuizSession {
        session_for(QuizKind::TextChoice, pool_size, count)
    }

    fn correct_of(session: &QuizSession, index: usize) -> Item {
        session.questions()[index].correct().clone()
    }

    fn wrong_of(session: &QuizSession, index: usize) -> Item {
        session.questions()[index].as_choice().unwrap().decoys()[0].clone()
    }

    fn is_match(session: &QuizSession, index: usize) -> bool {
        session.questions()[index].as_match().unwrap().is_match()
    }

    #[test]
    fn all_correct_scores_top_tier() {
        let mut s = session_of(5, 5);
        let mut result = None;
        for i in 0..5 {
            let answer = correct_of(&s, i);
            assert!(s.select_answer(i, &answer).unwrap().is_correct);
            match s.advance(fixed_now()).unwrap() {
                Advance::Next(n) => assert_eq!(n, i + 1),
                Advance::Completed(r) => result = Some(r),
            }
        }

        let result = result.expect("session completes after last question");
        assert_eq!(result.score(), 50);
        assert_eq!(result.total(), 50);
        assert_eq!(result.feedback(), FeedbackTier::Excellent);
        assert_eq!(result.kind(), QuizKind::TextChoice);
        assert_eq!(result.mode(), PoolSelector::Personal);
        assert!(s.is_complete());
    }

    #[test]
    fn score_is_ten_per_correct_answer() {
        let mut s = session_of(6, 4);
        let mut last = None;
        for i in 0..4 {
            let choice = if i % 2 == 0 { correct_of(&s, i) } else { wrong_of(&s, i) };
            s.select_answer(i, &choice).unwrap();
            if let Advance::Completed(r) = s.advance(fixed_now()).unwrap() {
                last = Some(r);
            }
        }
        let result = last.unwrap();
        assert_eq!(result.score(), 20);
        assert_eq!(result.total(), 40);
        assert_eq!(result.feedback(), FeedbackTier::NeedsWork);
    }

    #[test]
    fn select_answer_is_idempotent() {
        let mut s = session_of(5, 3);
        let right = correct_of(&s, 0);
        let wrong = wrong_of(&s, 0);

        s.select_answer(0, &wrong).unwrap();
        let second = s.select_answer(0, &right).unwrap().clone();

        assert_eq!(second.response, Response::Picked(wrong));
        assert!(!second.is_correct);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn advance_before_answering_is_a_violation() {
        let mut s = session_of(5, 3);
        assert_eq!(
            s.advance(fixed_now()).unwrap_err(),
            ProtocolViolation::Unanswered { index: 0 }
        );
    }

    #[test]
    fn retreat_at_first_question_is_a_violation() {
        let mut s = session_of(5, 3);
        assert_eq!(s.retreat().unwrap_err(), ProtocolViolation::AtFirstQuestion);
    }

    #[test]
    fn retreat_does_not_reopen_answers() {
        let mut s = session_of(5, 3);
        let wrong = wrong_of(&s, 0);
        s.select_answer(0, &wrong).unwrap();
        s.advance(fixed_now()).unwrap();

        assert_eq!(s.retreat().unwrap(), 0);
        let right = correct_of(&s, 0);
        let kept = s.select_answer(0, &right).unwrap();
        assert!(!kept.is_correct);
        assert_eq!(s.score(), 0);

        // Already answered, so moving forward again is allowed.
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Next(1));
    }

    #[test]
    fn answering_out_of_turn_is_a_violation() {
        let mut s = session_of(5, 3);
        let item = correct_of(&s, 1);
        assert_eq!(
            s.select_answer(1, &item).unwrap_err(),
            ProtocolViolation::OutOfTurn { index: 1, current: 0 }
        );
    }

    #[test]
    fn choosing_a_non_option_is_a_violation() {
        let mut s = session_of(5, 3);
        let stranger = Item::parse("stranger", "x.png").unwrap();
        assert!(matches!(
            s.select_answer(0, &stranger),
            Err(ProtocolViolation::UnknownOption { index: 0, .. })
        ));
        assert!(s.answer(0).is_none());
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut s = session_of(4, 1);
        let right = correct_of(&s, 0);
        s.select_answer(0, &right).unwrap();
        assert!(matches!(s.advance(fixed_now()).unwrap(), Advance::Completed(_)));

        assert_eq!(s.advance(fixed_now()).unwrap_err(), ProtocolViolation::Completed);
        assert_eq!(s.retreat().unwrap_err(), ProtocolViolation::Completed);
        assert_eq!(
            s.select_answer(0, &right).unwrap_err(),
            ProtocolViolation::Completed
        );
        assert!(s.current_question().is_none());
    }

    #[test]
    fn progress_tracks_answers() {
        let mut s = session_of(5, 3);
        let right = correct_of(&s, 0);
        s.select_answer(0, &right).unwrap();

        let p = s.progress();
        assert_eq!(p.total, 3);
        assert_eq!(p.answered, 1);
        assert_eq!(p.current_index, 0);
        assert_eq!(p.score, 10);
        assert!(!p.is_complete);
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::new(
            QuizKind::AudioGuess,
            PoolSelector::General,
            Vec::new(),
            ScoringPolicy::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionSetupError::NoQuestions);
    }

    #[test]
    fn zero_point_policy_is_rejected_up_front() {
        let questions = QuestionGenerator::new(2, 3)
            .generate_for(QuizKind::TextChoice, &pool_of(5), &mut StdRng::seed_from_u64(1))
            .unwrap();
        let policy = ScoringPolicy {
            points_per_correct: 0,
            ..ScoringPolicy::default()
        };
        let err = QuizSession::new(
            QuizKind::TextChoice,
            PoolSelector::Personal,
            questions,
            policy,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionSetupError::Scoring(ScoringPolicyError::ZeroPoints));

        let unordered = ScoringPolicy {
            good_percent: 90,
            ..ScoringPolicy::default()
        };
        let questions = QuestionGenerator::new(1, 3)
            .generate_for(QuizKind::TextChoice, &pool_of(5), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(matches!(
            QuizSession::new(
                QuizKind::TextChoice,
                PoolSelector::Personal,
                questions,
                unordered,
                fixed_now(),
            ),
            Err(SessionSetupError::Scoring(
                ScoringPolicyError::InvalidThresholds { .. }
            ))
        ));
    }

    #[test]
    fn questions_must_fit_the_kind() {
        let matches = QuestionGenerator::new(2, 3)
            .generate_for(QuizKind::TrueFalse, &pool_of(5), &mut StdRng::seed_from_u64(4))
            .unwrap();
        let err = QuizSession::new(
            QuizKind::TextChoice,
            PoolSelector::Personal,
            matches,
            ScoringPolicy::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SessionSetupError::FormatMismatch {
                index: 0,
                kind: QuizKind::TextChoice
            }
        );
    }

    #[test]
    fn true_false_session_scores_claims() {
        let mut s = session_for(QuizKind::TrueFalse, 8, 5);
        let mut result = None;
        for i in 0..5 {
            // Right on even questions, wrong on odd ones.
            let claim = if i % 2 == 0 { is_match(&s, i) } else { !is_match(&s, i) };
            let answer = s.claim_match(i, claim).unwrap();
            assert_eq!(answer.response, Response::Claimed(claim));
            assert_eq!(answer.is_correct, i % 2 == 0);
            if let Advance::Completed(r) = s.advance(fixed_now()).unwrap() {
                result = Some(r);
            }
        }

        let result = result.unwrap();
        assert_eq!(result.kind(), QuizKind::TrueFalse);
        assert_eq!(result.category(), crate::model::ResultCategory::Game);
        assert_eq!(result.score(), 30);
        assert_eq!(result.total(), 50);
        assert_eq!(result.feedback(), FeedbackTier::Good);
    }

    #[test]
    fn claims_are_write_once_and_format_checked() {
        let mut s = session_for(QuizKind::TrueFalse, 5, 3);
        let wrong = !is_match(&s, 0);
        s.claim_match(0, wrong).unwrap();
        let kept = s.claim_match(0, !wrong).unwrap().clone();
        assert_eq!(kept.response, Response::Claimed(wrong));
        assert_eq!(s.score(), 0);

        let subject = correct_of(&s, 0);
        assert_eq!(
            s.select_answer(0, &subject).unwrap_err(),
            ProtocolViolation::WrongFormat {
                index: 0,
                expected: QuestionFormat::Match
            }
        );

        let mut choice = session_of(5, 3);
        assert_eq!(
            choice.claim_match(0, true).unwrap_err(),
            ProtocolViolation::WrongFormat {
                index: 0,
                expected: QuestionFormat::Choice
            }
        );
        assert!(choice.answer(0).is_none());
    }
}
