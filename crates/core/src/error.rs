use thiserror::Error;

use crate::generator::GenerateError;
use crate::model::{IdentityError, ItemError, QuestionError, QuizResultError};
use crate::scoring::ScoringPolicyError;
use crate::session::{ProtocolViolation, SessionSetupError};

/// Umbrella error for callers that do not care which domain rule failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    Scoring(#[from] ScoringPolicyError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
}
