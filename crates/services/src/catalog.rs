use std::sync::Arc;

use quiz_core::model::{Identity, ItemPool, PoolSelector};
use storage::repository::{CatalogScope, ItemRepository};

use crate::error::CatalogError;

/// Turns raw catalog records into a quiz-ready pool.
#[derive(Clone)]
pub struct ItemCatalog {
    items: Arc<dyn ItemRepository>,
}

impl ItemCatalog {
    #[must_use]
    pub fn new(items: Arc<dyn ItemRepository>) -> Self {
        Self { items }
    }

    /// Fetch the selected collection, drop unusable records and duplicate
    /// labels (first occurrence wins).
    ///
    /// Fetched on every call, never cached.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` if fewer than `min_items` usable
    /// items remain, `CatalogError::Storage` if the fetch fails.
    pub async fn load(
        &self,
        selector: PoolSelector,
        identity: &Identity,
        min_items: usize,
    ) -> Result<ItemPool, CatalogError> {
        let scope = CatalogScope::for_pool(selector, identity);
        let rows = self.items.list_records(&scope).await?;
        let fetched = rows.len();

        let items = rows.into_iter().filter_map(|row| match row.record.to_item() {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::debug!(id = %row.id, %err, "skipping catalog record");
                None
            }
        });
        let pool = ItemPool::from_items(items);

        tracing::debug!(
            pool = %selector,
            fetched,
            usable = pool.len(),
            "catalog loaded"
        );

        if pool.len() < min_items {
            return Err(CatalogError::EmptyCatalog {
                required: min_items,
                available: pool.len(),
            });
        }
        Ok(pool)
    }
}
