use rand::Rng;
use rand::seq::{SliceRandom, index};
use thiserror::Error;

use crate::model::{
    Item, ItemPool, MatchQuestion, Prompt, Question, QuestionError, QuestionFormat, QuizKind,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("pool has {available} items but {required} are needed per question")]
    InsufficientPool { required: usize, available: usize },

    #[error("a quiz needs at least one question")]
    InvalidQuestionCount,

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Builds a sequence of multiple-choice questions from an item pool.
///
/// Correct answers are drawn without replacement, so no item is asked twice
/// in one session. Each question draws its own decoys without replacement from
/// the rest of the pool, then shuffles the options.
///
/// # Examples
///
/// ```
/// # use quiz_core::QuestionGenerator;
/// # use quiz_core::model::{Item, ItemPool};
/// use rand::SeedableRng;
///
/// let pool = ItemPool::from_items(
///     ["elma", "armut", "muz", "kiraz", "erik"]
///         .into_iter()
///         .map(|w| Item::parse(w, format!("{w}.png")).unwrap()),
/// );
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let questions = QuestionGenerator::new(5, 3).generate(&pool, &mut rng)?;
///
/// assert_eq!(questions.len(), 5);
/// assert!(questions.iter().all(|q| q.options().len() == 4));
/// # Ok::<(), quiz_core::GenerateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionGenerator {
    question_count: usize,
    decoys_per_question: usize,
}

impl QuestionGenerator {
    #[must_use]
    pub fn new(question_count: usize, decoys_per_question: usize) -> Self {
        Self {
            question_count,
            decoys_per_question,
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn decoys_per_question(&self) -> usize {
        self.decoys_per_question
    }

    /// Number of questions `generate` will produce for a pool of `pool_len`
    /// items. Requests larger than the pool are clamped to it.
    #[must_use]
    pub fn effective_count(&self, pool_len: usize) -> usize {
        self.question_count.min(pool_len)
    }

    /// Generate questions from `pool` using `rng`.
    ///
    /// # Errors
    ///
    /// - `InvalidQuestionCount` if zero questions were requested
    /// - `InsufficientPool` if the pool cannot supply a correct answer plus
    ///   `decoys_per_question` distinct decoys
    pub fn generate<R: Rng + ?Sized>(
        &self,
        pool: &ItemPool,
        rng: &mut R,
    ) -> Result<Vec<Question>, GenerateError> {
        if self.question_count == 0 {
            return Err(GenerateError::InvalidQuestionCount);
        }
        let required = self.decoys_per_question + 1;
        if pool.len() < required {
            return Err(GenerateError::InsufficientPool {
                required,
                available: pool.len(),
            });
        }

        let items = pool.items();
        let count = self.effective_count(items.len());

        index::sample(rng, items.len(), count)
            .into_iter()
            .map(|answer_idx| self.build_question(items, answer_idx, rng))
            .collect()
    }

    /// Generate match/no-match questions. Each subject is shown with its own
    /// label or with one decoy's, with even odds. `decoys_per_question` is not
    /// used: a match question needs exactly one other item to draw from.
    ///
    /// # Errors
    ///
    /// - `InvalidQuestionCount` if zero questions were requested
    /// - `InsufficientPool` if the pool has fewer than two items
    pub fn generate_matches<R: Rng + ?Sized>(
        &self,
        pool: &ItemPool,
        rng: &mut R,
    ) -> Result<Vec<MatchQuestion>, GenerateError> {
        if self.question_count == 0 {
            return Err(GenerateError::InvalidQuestionCount);
        }
        if pool.len() < 2 {
            return Err(GenerateError::InsufficientPool {
                required: 2,
                available: pool.len(),
            });
        }

        let items = pool.items();
        let count = self.effective_count(items.len());

        let questions = index::sample(rng, items.len(), count)
            .into_iter()
            .map(|subject_idx| {
                let shown_idx = if rng.random_bool(0.5) {
                    subject_idx
                } else {
                    let other = rng.random_range(0..items.len() - 1);
                    if other >= subject_idx { other + 1 } else { other }
                };
                MatchQuestion::new(items[subject_idx].clone(), items[shown_idx].clone())
            })
            .collect();
        Ok(questions)
    }

    /// Generate the questions `kind` is played with.
    ///
    /// # Errors
    ///
    /// See [`QuestionGenerator::generate`] and
    /// [`QuestionGenerator::generate_matches`].
    pub fn generate_for<R: Rng + ?Sized>(
        &self,
        kind: QuizKind,
        pool: &ItemPool,
        rng: &mut R,
    ) -> Result<Vec<Prompt>, GenerateError> {
        let prompts = match kind.format() {
            QuestionFormat::Choice => self
                .generate(pool, rng)?
                .into_iter()
                .map(Prompt::from)
                .collect(),
            QuestionFormat::Match => self
                .generate_matches(pool, rng)?
                .into_iter()
                .map(Prompt::from)
                .collect(),
        };
        Ok(prompts)
    }

    fn build_question<R: Rng + ?Sized>(
        &self,
        items: &[Item],
        answer_idx: usize,
        rng: &mut R,
    ) -> Result<Question, GenerateError> {
        let correct = items[answer_idx].clone();

        // Sample over the pool minus the answer: shift indices at or past the
        // answer up by one.
        let decoys: Vec<Item> = index::sample(rng, items.len() - 1, self.decoys_per_question)
            .into_iter()
            .map(|i| if i >= answer_idx { i + 1 } else { i })
            .map(|i| items[i].clone())
            .collect();

        let mut display_order = Vec::with_capacity(decoys.len() + 1);
        display_order.push(correct.clone());
        display_order.extend(decoys.iter().cloned());
        display_order.shuffle(rng);

        Ok(Question::new(correct, decoys, display_order)?)
    }
}
