use quiz_core::model::ItemId;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, item_id_from_i64, map_catalog_row};
use crate::repository::{CatalogRecord, CatalogRow, CatalogScope, ItemRepository, StorageError};

fn owner_of(scope: &CatalogScope) -> Option<String> {
    scope.owner().map(|identity| identity.as_str().to_owned())
}

#[async_trait::async_trait]
impl ItemRepository for SqliteRepository {
    async fn list_records(&self, scope: &CatalogScope) -> Result<Vec<CatalogRow>, StorageError> {
        // `IS` matches NULL owners for the shared pool.
        let rows = sqlx::query(
            r"
                SELECT id, label, photo_url, image_url, recognized_at
                FROM catalog_items
                WHERE owner IS ?1
                ORDER BY id ASC
            ",
        )
        .bind(owner_of(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_catalog_row).collect()
    }

    async fn insert_record(
        &self,
        scope: &CatalogScope,
        record: &CatalogRecord,
    ) -> Result<ItemId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO catalog_items (owner, label, photo_url, image_url, recognized_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(owner_of(scope))
        .bind(&record.label)
        .bind(record.photo_url.as_deref())
        .bind(record.image_url.as_deref())
        .bind(record.recognized_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        item_id_from_i64(res.last_insert_rowid())
    }

    async fn delete_record(&self, scope: &CatalogScope, id: ItemId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM catalog_items WHERE id = ?1 AND owner IS ?2")
            .bind(id_to_i64("item_id", id.value())?)
            .bind(owner_of(scope))
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
