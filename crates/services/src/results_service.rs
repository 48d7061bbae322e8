use std::sync::Arc;

use quiz_core::model::{Identity, KindStats, ResultCategory};
use storage::repository::{ResultRepository, ResultRow};

use crate::error::ResultsError;
use crate::identity::IdentityProvider;

/// Upper bound on results read for aggregate stats.
const STATS_WINDOW: u32 = 10_000;

/// Read side of the learner's quiz history.
#[derive(Clone)]
pub struct ResultsService {
    results: Arc<dyn ResultRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl ResultsService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { results, identity }
    }

    /// Up to `limit` results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::MissingIdentity` or `ResultsError::Storage`.
    pub async fn history(
        &self,
        category: Option<ResultCategory>,
        limit: u32,
    ) -> Result<Vec<ResultRow>, ResultsError> {
        let identity = self.identity()?;
        Ok(self.results.list_results(&identity, category, limit).await?)
    }

    /// Per-kind aggregates over the learner's history.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::MissingIdentity` or `ResultsError::Storage`.
    pub async fn stats(
        &self,
        category: Option<ResultCategory>,
    ) -> Result<Vec<KindStats>, ResultsError> {
        let rows = self.history(category, STATS_WINDOW).await?;
        Ok(KindStats::from_results(rows.iter().map(|row| &row.result)))
    }

    fn identity(&self) -> Result<Identity, ResultsError> {
        self.identity.current().ok_or(ResultsError::MissingIdentity)
    }
}
