#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod scoring;
pub mod session;
pub mod time;

pub use error::Error;
pub use generator::{GenerateError, QuestionGenerator};
pub use scoring::{ScoringPolicy, ScoringPolicyError};
pub use session::{
    Advance, Answer, ProtocolViolation, QuizSession, Response, SessionProgress, SessionSetupError,
};
pub use time::Clock;
