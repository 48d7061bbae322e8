mod ids;
mod item;
mod question;
mod result;
mod stats;

pub use ids::{Identity, IdentityError, ItemId, ResultId};
pub use item::{ImageRef, Item, ItemError, ItemPool, Label};
pub use question::{MatchQuestion, Prompt, Question, QuestionError, QuestionFormat};
pub use result::{FeedbackTier, PoolSelector, QuizKind, QuizResult, QuizResultError, ResultCategory};
pub use stats::KindStats;
