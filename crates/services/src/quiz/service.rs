use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quiz_core::model::PoolSelector;
use quiz_core::{Advance, QuizSession, ScoringPolicy, ScoringPolicyError};
use storage::repository::{ItemRepository, ResultRepository};

use super::active::{ActiveQuiz, AdvanceOutcome, QuizCompletion, QuizRequest};
use crate::Clock;
use crate::catalog::ItemCatalog;
use crate::config::{EngineConfig, QuizSettings};
use crate::error::{ConfigError, PersistFailure, QuizServiceError};
use crate::identity::IdentityProvider;

/// Orchestrates catalog load, question generation, answering and result
/// persistence.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    catalog: ItemCatalog,
    results: Arc<dyn ResultRepository>,
    identity: Arc<dyn IdentityProvider>,
    policy: ScoringPolicy,
    personal_settings: QuizSettings,
    general_settings: QuizSettings,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        items: Arc<dyn ItemRepository>,
        results: Arc<dyn ResultRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            clock,
            catalog: ItemCatalog::new(items),
            results,
            identity,
            policy: ScoringPolicy::default(),
            personal_settings: QuizSettings::PERSONAL,
            general_settings: QuizSettings::GENERAL,
        }
    }

    /// Take scoring and per-pool settings from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` does not validate.
    pub fn with_config(mut self, config: &EngineConfig) -> Result<Self, ConfigError> {
        let config = config.clone().validate()?;
        self.policy = config.scoring;
        self.personal_settings = config.personal_settings;
        self.general_settings = config.general_settings;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ScoringPolicyError` if `policy` does not validate.
    pub fn with_policy(mut self, policy: ScoringPolicy) -> Result<Self, ScoringPolicyError> {
        self.policy = policy.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    #[must_use]
    pub fn settings_for(&self, pool: PoolSelector) -> QuizSettings {
        match pool {
            PoolSelector::Personal => self.personal_settings,
            PoolSelector::General => self.general_settings,
        }
    }

    /// Start a quiz with an OS-seeded RNG.
    ///
    /// # Errors
    ///
    /// See [`QuizService::start_session_with_rng`].
    pub async fn start_session(&self, request: QuizRequest) -> Result<ActiveQuiz, QuizServiceError> {
        let mut rng = StdRng::from_os_rng();
        self.start_session_with_rng(request, &mut rng).await
    }

    /// Start a quiz, drawing questions with `rng`.
    ///
    /// # Errors
    ///
    /// - `MissingIdentity` if nobody is signed in
    /// - `Settings` if the request carries invalid settings
    /// - `Catalog` if the pool is empty or cannot be fetched
    /// - `Generate` if the pool cannot supply enough decoys
    /// - `Session` if the generated questions cannot start a session
    pub async fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        request: QuizRequest,
        rng: &mut R,
    ) -> Result<ActiveQuiz, QuizServiceError> {
        let identity = self
            .identity
            .current()
            .ok_or(QuizServiceError::MissingIdentity)?;
        let settings = request
            .settings
            .unwrap_or_else(|| self.settings_for(request.pool))
            .validate()?;

        let pool = self.catalog.load(request.pool, &identity, 1).await?;

        let generator = settings.generator();
        let count = generator.effective_count(pool.len());
        if count < settings.question_count {
            tracing::warn!(
                requested = settings.question_count,
                available = pool.len(),
                "question count clamped to pool size"
            );
        }
        let questions = generator.generate_for(request.kind, &pool, rng)?;

        let session = QuizSession::new(
            request.kind,
            request.pool,
            questions,
            self.policy,
            self.clock.now(),
        )?;
        tracing::info!(
            identity = %identity,
            kind = %request.kind,
            pool = %request.pool,
            questions = count,
            "quiz started"
        );
        Ok(ActiveQuiz::new(session, identity))
    }

    /// Move past the current question. Leaving the last one completes the
    /// quiz and appends its result to the learner's history.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Protocol` if the current question is
    /// unanswered or the quiz is already complete. Persistence failures are
    /// reported inside [`QuizCompletion`], not here.
    pub async fn advance(&self, quiz: &mut ActiveQuiz) -> Result<AdvanceOutcome, QuizServiceError> {
        let result = match quiz.session.advance(self.clock.now())? {
            Advance::Next(index) => return Ok(AdvanceOutcome::Next(index)),
            Advance::Completed(result) => result,
        };

        tracing::info!(
            identity = %quiz.identity,
            kind = %result.kind(),
            score = result.score(),
            total = result.total(),
            feedback = %result.feedback(),
            "quiz completed"
        );

        let persisted = self
            .results
            .append_result(&quiz.identity, &result)
            .await
            .map_err(PersistFailure::new);
        if let Err(err) = &persisted {
            tracing::warn!(identity = %quiz.identity, %err, "quiz result not saved");
        }

        Ok(AdvanceOutcome::Completed(QuizCompletion { result, persisted }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::identity::{Anonymous, StaticIdentity};
    use quiz_core::GenerateError;
    use quiz_core::model::{Identity, QuizKind};
    use quiz_core::time::fixed_clock;
    use storage::repository::{CatalogRecord, CatalogScope, InMemoryRepository};

    async fn seeded(labels: &[&str]) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for label in labels {
            let record = CatalogRecord {
                label: (*label).to_owned(),
                photo_url: None,
                image_url: Some(format!("{label}.png")),
                recognized_at: quiz_core::time::fixed_now(),
            };
            repo.insert_record(&CatalogScope::General, &record)
                .await
                .unwrap();
        }
        repo
    }

    fn service(repo: &InMemoryRepository, identity: Arc<dyn IdentityProvider>) -> QuizService {
        QuizService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            identity,
        )
    }

    fn me() -> Arc<dyn IdentityProvider> {
        Arc::new(StaticIdentity::new(Identity::new("me").unwrap()))
    }

    #[tokio::test]
    async fn start_requires_identity() {
        let repo = seeded(&["a", "b", "c", "d"]).await;
        let svc = service(&repo, Arc::new(Anonymous));
        let err = svc
            .start_session(QuizRequest::new(QuizKind::TextChoice, PoolSelector::General))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::MissingIdentity));
    }

    #[tokio::test]
    async fn start_clamps_to_pool_size() {
        let repo = seeded(&["a", "b", "c", "d", "e"]).await;
        let svc = service(&repo, me());
        let mut rng = StdRng::seed_from_u64(11);
        let quiz = svc
            .start_session_with_rng(
                QuizRequest::new(QuizKind::ImageChoice, PoolSelector::General),
                &mut rng,
            )
            .await
            .unwrap();
        assert_eq!(quiz.progress().total, 5);
        assert_eq!(quiz.current_index(), Some(0));
        assert_eq!(quiz.session().total(), 50);
    }

    #[tokio::test]
    async fn small_or_empty_pools_fail() {
        let repo = seeded(&["a", "b"]).await;
        let svc = service(&repo, me());

        let err = svc
            .start_session(QuizRequest::new(QuizKind::TextChoice, PoolSelector::General))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Generate(GenerateError::InsufficientPool {
                required: 4,
                available: 2
            })
        ));

        let err = svc
            .start_session(QuizRequest::new(QuizKind::TextChoice, PoolSelector::Personal))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Catalog(CatalogError::EmptyCatalog { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_scoring_is_rejected_when_configured() {
        let repo = seeded(&["a", "b", "c", "d"]).await;
        let zero = ScoringPolicy {
            points_per_correct: 0,
            ..ScoringPolicy::default()
        };

        assert!(matches!(
            service(&repo, me()).with_policy(zero),
            Err(ScoringPolicyError::ZeroPoints)
        ));

        let config = EngineConfig {
            scoring: zero,
            ..EngineConfig::default()
        };
        assert!(matches!(
            service(&repo, me()).with_config(&config),
            Err(ConfigError::Scoring(ScoringPolicyError::ZeroPoints))
        ));

        let svc = service(&repo, me())
            .with_policy(ScoringPolicy {
                points_per_correct: 5,
                ..ScoringPolicy::default()
            })
            .unwrap();
        let quiz = svc
            .start_session(QuizRequest::new(QuizKind::TextChoice, PoolSelector::General))
            .await
            .unwrap();
        assert_eq!(quiz.session().total(), 20);
    }

    #[tokio::test]
    async fn true_false_needs_only_two_items() {
        let repo = seeded(&["a", "b"]).await;
        let svc = service(&repo, me());
        let mut rng = StdRng::seed_from_u64(3);
        let quiz = svc
            .start_session_with_rng(
                QuizRequest::new(QuizKind::TrueFalse, PoolSelector::General),
                &mut rng,
            )
            .await
            .unwrap();
        assert_eq!(quiz.progress().total, 2);
        assert!(quiz.current_question().unwrap().as_match().is_some());
    }

    #[tokio::test]
    async fn invalid_request_settings_are_rejected() {
        let repo = seeded(&["a", "b", "c", "d"]).await;
        let svc = service(&repo, me());
        let request = QuizRequest::new(QuizKind::TextChoice, PoolSelector::General).with_settings(
            QuizSettings {
                question_count: 0,
                decoys_per_question: 3,
            },
        );
        let err = svc.start_session(request).await.unwrap_err();
        assert!(matches!(err, QuizServiceError::Settings(_)));
    }
}
