use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    Identity, ImageRef, Item, ItemError, ItemId, Label, PoolSelector, QuizResult, ResultCategory,
    ResultId,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Which collection a catalog operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogScope {
    /// One learner's library of recognized items.
    Personal(Identity),
    /// The shared pool.
    General,
}

impl CatalogScope {
    #[must_use]
    pub fn for_pool(selector: PoolSelector, identity: &Identity) -> Self {
        match selector {
            PoolSelector::Personal => Self::Personal(identity.clone()),
            PoolSelector::General => Self::General,
        }
    }

    /// Owner of the collection, `None` for the shared pool.
    #[must_use]
    pub fn owner(&self) -> Option<&Identity> {
        match self {
            Self::Personal(identity) => Some(identity),
            Self::General => None,
        }
    }
}

/// Persisted shape of a catalog entry.
///
/// Records are stored as received, so a record may be unusable for quizzes
/// (blank label, no picture); [`CatalogRecord::to_item`] decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub label: String,
    /// Upload URL of a photo the learner took.
    pub photo_url: Option<String>,
    /// Catalogue image URL (general pool records).
    pub image_url: Option<String>,
    pub recognized_at: DateTime<Utc>,
}

impl CatalogRecord {
    #[must_use]
    pub fn from_item(item: &Item, recognized_at: DateTime<Utc>) -> Self {
        Self {
            label: item.label().as_str().to_owned(),
            photo_url: Some(item.image().as_str().to_owned()),
            image_url: None,
            recognized_at,
        }
    }

    /// Convert the record into a quiz item, preferring the photo over the
    /// catalogue image.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the label is blank or neither image is set.
    pub fn to_item(&self) -> Result<Item, ItemError> {
        let label = Label::new(self.label.as_str())?;
        let image = ImageRef::first_of(self.photo_url.as_deref(), self.image_url.as_deref())?;
        Ok(Item::new(label, image))
    }
}

/// A catalog record with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub id: ItemId,
    pub record: CatalogRecord,
}

/// A stored result with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: ResultId,
    pub result: QuizResult,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Catalog source for quizzes and the personal library.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All records in `scope`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn list_records(&self, scope: &CatalogScope) -> Result<Vec<CatalogRow>, StorageError>;

    /// Append a record to `scope`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn insert_record(
        &self,
        scope: &CatalogScope,
        record: &CatalogRecord,
    ) -> Result<ItemId, StorageError>;

    /// Remove a record from `scope`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `id` is not in `scope`.
    async fn delete_record(&self, scope: &CatalogScope, id: ItemId) -> Result<(), StorageError>;
}

/// Append-only result sink, one history per identity.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(
        &self,
        identity: &Identity,
        result: &QuizResult,
    ) -> Result<ResultId, StorageError>;

    /// Newest results first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the results cannot be read.
    async fn list_results(
        &self,
        identity: &Identity,
        category: Option<ResultCategory>,
        limit: u32,
    ) -> Result<Vec<ResultRow>, StorageError>;
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    next_item_id: u64,
    next_result_id: u64,
    items: Vec<(ItemId, CatalogScope, CatalogRecord)>,
    results: Vec<(ResultId, Identity, QuizResult)>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn list_records(&self, scope: &CatalogScope) -> Result<Vec<CatalogRow>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .items
            .iter()
            .filter(|(_, s, _)| s == scope)
            .map(|(id, _, record)| CatalogRow {
                id: *id,
                record: record.clone(),
            })
            .collect())
    }

    async fn insert_record(
        &self,
        scope: &CatalogScope,
        record: &CatalogRecord,
    ) -> Result<ItemId, StorageError> {
        let mut guard = self.lock()?;
        guard.next_item_id += 1;
        let id = ItemId::new(guard.next_item_id);
        guard.items.push((id, scope.clone(), record.clone()));
        Ok(id)
    }

    async fn delete_record(&self, scope: &CatalogScope, id: ItemId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let before = guard.items.len();
        guard
            .items
            .retain(|(item_id, s, _)| !(*item_id == id && s == scope));
        if guard.items.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(
        &self,
        identity: &Identity,
        result: &QuizResult,
    ) -> Result<ResultId, StorageError> {
        let mut guard = self.lock()?;
        guard.next_result_id += 1;
        let id = ResultId::new(guard.next_result_id);
        guard.results.push((id, identity.clone(), result.clone()));
        Ok(id)
    }

    async fn list_results(
        &self,
        identity: &Identity,
        category: Option<ResultCategory>,
        limit: u32,
    ) -> Result<Vec<ResultRow>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<ResultRow> = guard
            .results
            .iter()
            .filter(|(_, owner, result)| {
                owner == identity && category.is_none_or(|c| result.category() == c)
            })
            .map(|(id, _, result)| ResultRow {
                id: *id,
                result: result.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn ItemRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let items: Arc<dyn ItemRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self { items, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{FeedbackTier, QuizKind};
    use quiz_core::time::fixed_now;

    fn record(label: &str, photo: Option<&str>, image: Option<&str>) -> CatalogRecord {
        CatalogRecord {
            label: label.to_owned(),
            photo_url: photo.map(str::to_owned),
            image_url: image.map(str::to_owned),
            recognized_at: fixed_now(),
        }
    }

    fn result(kind: QuizKind, score: u32, minutes: i64) -> QuizResult {
        QuizResult::from_persisted(
            kind,
            PoolSelector::General,
            score,
            50,
            FeedbackTier::Good,
            fixed_now() + Duration::minutes(minutes),
        )
        .unwrap()
    }

    #[test]
    fn record_to_item_prefers_photo() {
        let item = record("kedi", Some("photo.jpg"), Some("cdn.png"))
            .to_item()
            .unwrap();
        assert_eq!(item.image().as_str(), "photo.jpg");

        let item = record("kedi", None, Some("cdn.png")).to_item().unwrap();
        assert_eq!(item.image().as_str(), "cdn.png");

        assert_eq!(
            record("kedi", None, None).to_item().unwrap_err(),
            ItemError::MissingImage
        );
        assert_eq!(
            record(" ", Some("p.jpg"), None).to_item().unwrap_err(),
            ItemError::EmptyLabel
        );
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let repo = InMemoryRepository::new();
        let alice = CatalogScope::Personal(Identity::new("alice").unwrap());
        let bob = CatalogScope::Personal(Identity::new("bob").unwrap());

        let id = repo
            .insert_record(&alice, &record("kedi", Some("a.jpg"), None))
            .await
            .unwrap();
        repo.insert_record(&CatalogScope::General, &record("köpek", None, Some("b.png")))
            .await
            .unwrap();

        assert_eq!(repo.list_records(&alice).await.unwrap().len(), 1);
        assert!(repo.list_records(&bob).await.unwrap().is_empty());
        assert_eq!(repo.list_records(&CatalogScope::General).await.unwrap().len(), 1);

        let err = repo.delete_record(&bob, id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        repo.delete_record(&alice, id).await.unwrap();
        assert!(repo.list_records(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_listed_newest_first_and_filtered() {
        let repo = InMemoryRepository::new();
        let me = Identity::new("me").unwrap();
        let other = Identity::new("other").unwrap();

        repo.append_result(&me, &result(QuizKind::TextChoice, 10, 0))
            .await
            .unwrap();
        repo.append_result(&me, &result(QuizKind::AudioGuess, 20, 5))
            .await
            .unwrap();
        repo.append_result(&me, &result(QuizKind::ImageChoice, 30, 10))
            .await
            .unwrap();
        repo.append_result(&other, &result(QuizKind::TextChoice, 50, 20))
            .await
            .unwrap();

        let all = repo.list_results(&me, None, 10).await.unwrap();
        let scores: Vec<_> = all.iter().map(|r| r.result.score()).collect();
        assert_eq!(scores, [30, 20, 10]);

        let exams = repo
            .list_results(&me, Some(ResultCategory::Exam), 10)
            .await
            .unwrap();
        assert_eq!(exams.len(), 2);

        let limited = repo.list_results(&me, None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].result.score(), 30);
    }
}
