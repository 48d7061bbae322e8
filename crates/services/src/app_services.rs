use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config::EngineConfig;
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::library_service::LibraryService;
use crate::quiz::QuizService;
use crate::results_service::ResultsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: EngineConfig,
    quiz: Arc<QuizService>,
    library: Arc<LibraryService>,
    results: Arc<ResultsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` at `config.database_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the config is invalid or storage
    /// initialization fails.
    pub async fn new_sqlite(
        config: EngineConfig,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let config = config.validate()?;
        let storage = Storage::sqlite(&config.database_url).await?;
        tracing::info!(database_url = %config.database_url, "storage ready");
        Self::from_storage(config, &storage, clock, identity)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if the config is invalid.
    pub fn new_in_memory(
        config: EngineConfig,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        Self::from_storage(config, &Storage::in_memory(), clock, identity)
    }

    fn from_storage(
        config: EngineConfig,
        storage: &Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let quiz = Arc::new(
            QuizService::new(
                clock,
                Arc::clone(&storage.items),
                Arc::clone(&storage.results),
                Arc::clone(&identity),
            )
            .with_config(&config)?,
        );
        let library = Arc::new(LibraryService::new(
            clock,
            Arc::clone(&storage.items),
            Arc::clone(&identity),
        ));
        let results = Arc::new(ResultsService::new(Arc::clone(&storage.results), identity));

        Ok(Self {
            config,
            quiz,
            library,
            results,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }
}
