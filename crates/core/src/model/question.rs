use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Item, Label};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("decoy `{0}` has the same label as the correct answer")]
    DecoyMatchesAnswer(Label),

    #[error("decoy label `{0}` appears more than once")]
    DuplicateDecoy(Label),

    #[error("display order must contain the correct answer and every decoy exactly once")]
    DisplayOrderMismatch,
}

/// One multiple-choice question: the correct item, its decoys, and the order
/// options are shown in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    correct: Item,
    decoys: Vec<Item>,
    display_order: Vec<Item>,
}

impl Question {
    /// Assemble a question, checking that decoys are distinct from each other and
    /// from the answer, and that `display_order` is a permutation of both.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any of those invariants is broken.
    pub fn new(
        correct: Item,
        decoys: Vec<Item>,
        display_order: Vec<Item>,
    ) -> Result<Self, QuestionError> {
        let mut labels = HashSet::with_capacity(decoys.len() + 1);
        labels.insert(correct.label().clone());
        for decoy in &decoys {
            if decoy.same_label(&correct) {
                return Err(QuestionError::DecoyMatchesAnswer(decoy.label().clone()));
            }
            if !labels.insert(decoy.label().clone()) {
                return Err(QuestionError::DuplicateDecoy(decoy.label().clone()));
            }
        }

        if display_order.len() != labels.len() {
            return Err(QuestionError::DisplayOrderMismatch);
        }
        let mut shown = HashSet::with_capacity(display_order.len());
        for option in &display_order {
            if !labels.contains(option.label()) || !shown.insert(option.label()) {
                return Err(QuestionError::DisplayOrderMismatch);
            }
        }

        Ok(Self {
            correct,
            decoys,
            display_order,
        })
    }

    #[must_use]
    pub fn correct(&self) -> &Item {
        &self.correct
    }

    #[must_use]
    pub fn decoys(&self) -> &[Item] {
        &self.decoys
    }

    /// Options in the order they should be presented.
    #[must_use]
    pub fn options(&self) -> &[Item] {
        &self.display_order
    }

    #[must_use]
    pub fn is_correct(&self, chosen: &Item) -> bool {
        chosen.same_label(&self.correct)
    }

    #[must_use]
    pub fn has_option(&self, candidate: &Item) -> bool {
        self.display_order.iter().any(|o| o.same_label(candidate))
    }

    /// Position of the correct answer within [`Question::options`].
    #[must_use]
    pub fn correct_position(&self) -> Option<usize> {
        self.display_order
            .iter()
            .position(|o| o.same_label(&self.correct))
    }
}

/// One match/no-match question: the subject's picture shown next to a
/// candidate label, which is either the subject's own or a decoy's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuestion {
    subject: Item,
    shown: Item,
}

impl MatchQuestion {
    #[must_use]
    pub fn new(subject: Item, shown: Item) -> Self {
        Self { subject, shown }
    }

    #[must_use]
    pub fn subject(&self) -> &Item {
        &self.subject
    }

    /// Item whose label is presented as the candidate.
    #[must_use]
    pub fn shown(&self) -> &Item {
        &self.shown
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.shown.same_label(&self.subject)
    }

    /// Whether the learner's claim ("it matches" or "it does not") is right.
    #[must_use]
    pub fn is_correct(&self, claims_match: bool) -> bool {
        claims_match == self.is_match()
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionFormat {
    /// Pick one of several options.
    Choice,
    /// Say whether the shown label matches.
    Match,
}

/// A question of either format, as held by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Choice(Question),
    Match(MatchQuestion),
}

impl Prompt {
    #[must_use]
    pub fn format(&self) -> QuestionFormat {
        match self {
            Prompt::Choice(_) => QuestionFormat::Choice,
            Prompt::Match(_) => QuestionFormat::Match,
        }
    }

    /// The item the question is about.
    #[must_use]
    pub fn correct(&self) -> &Item {
        match self {
            Prompt::Choice(q) => q.correct(),
            Prompt::Match(q) => q.subject(),
        }
    }

    #[must_use]
    pub fn as_choice(&self) -> Option<&Question> {
        match self {
            Prompt::Choice(q) => Some(q),
            Prompt::Match(_) => None,
        }
    }

    #[must_use]
    pub fn as_match(&self) -> Option<&MatchQuestion> {
        match self {
            Prompt::Match(q) => Some(q),
            Prompt::Choice(_) => None,
        }
    }
}

impl From<Question> for Prompt {
    fn from(q: Question) -> Self {
        Prompt::Choice(q)
    }
}

impl From<MatchQuestion> for Prompt {
    fn from(q: MatchQuestion) -> Self {
        Prompt::Match(q)
    }
}
