mod active;
mod service;

pub use active::{ActiveQuiz, AdvanceOutcome, QuizCompletion, QuizRequest};
pub use service::QuizService;
