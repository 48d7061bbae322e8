use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Item, ItemId};
use storage::repository::{CatalogRecord, CatalogScope, ItemRepository};

use crate::Clock;
use crate::error::LibraryError;
use crate::identity::IdentityProvider;

/// One recognized item in a learner's library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: ItemId,
    pub item: Item,
    pub recognized_at: DateTime<Utc>,
}

/// The signed-in learner's personal collection.
#[derive(Clone)]
pub struct LibraryService {
    clock: Clock,
    items: Arc<dyn ItemRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl LibraryService {
    #[must_use]
    pub fn new(
        clock: Clock,
        items: Arc<dyn ItemRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            clock,
            items,
            identity,
        }
    }

    /// Store a freshly recognized item, stamped with the clock's time.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::MissingIdentity` if nobody is signed in,
    /// `LibraryError::Item` for a blank label or image, or
    /// `LibraryError::Storage` if the write fails.
    pub async fn add_item(
        &self,
        label: &str,
        image_ref: &str,
    ) -> Result<LibraryEntry, LibraryError> {
        let scope = self.scope()?;
        let item = Item::parse(label, image_ref)?;
        let recognized_at = self.clock.now();
        let id = self
            .items
            .insert_record(&scope, &CatalogRecord::from_item(&item, recognized_at))
            .await?;
        tracing::debug!(%id, label = %item.label(), "library item added");
        Ok(LibraryEntry {
            id,
            item,
            recognized_at,
        })
    }

    /// Library entries, newest first. Records that cannot form an item are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::MissingIdentity` or `LibraryError::Storage`.
    pub async fn list_items(&self) -> Result<Vec<LibraryEntry>, LibraryError> {
        let scope = self.scope()?;
        let rows = self.items.list_records(&scope).await?;
        let mut entries: Vec<LibraryEntry> = rows
            .into_iter()
            .filter_map(|row| {
                let item = row.record.to_item().ok()?;
                Some(LibraryEntry {
                    id: row.id,
                    item,
                    recognized_at: row.record.recognized_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.recognized_at
                .cmp(&a.recognized_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` wrapping `StorageError::NotFound` if
    /// `id` is not in the learner's library.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), LibraryError> {
        let scope = self.scope()?;
        self.items.delete_record(&scope, id).await?;
        tracing::debug!(%id, "library item deleted");
        Ok(())
    }

    fn scope(&self) -> Result<CatalogScope, LibraryError> {
        self.identity
            .current()
            .map(CatalogScope::Personal)
            .ok_or(LibraryError::MissingIdentity)
    }
}
