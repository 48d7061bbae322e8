use quiz_core::model::{
    FeedbackTier, ItemId, PoolSelector, QuizKind, QuizResult, ResultId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{CatalogRecord, CatalogRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn item_id_from_i64(v: i64) -> Result<ItemId, StorageError> {
    Ok(ItemId::new(i64_to_u64("item_id", v)?))
}

pub(crate) fn result_id_from_i64(v: i64) -> Result<ResultId, StorageError> {
    Ok(ResultId::new(i64_to_u64("result_id", v)?))
}

pub(crate) fn map_catalog_row(row: &SqliteRow) -> Result<CatalogRow, StorageError> {
    let id = item_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let record = CatalogRecord {
        label: row.try_get("label").map_err(ser)?,
        photo_url: row.try_get("photo_url").map_err(ser)?,
        image_url: row.try_get("image_url").map_err(ser)?,
        recognized_at: row.try_get("recognized_at").map_err(ser)?,
    };
    Ok(CatalogRow { id, record })
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<(ResultId, QuizResult), StorageError> {
    let id = result_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let kind: QuizKind = row.try_get::<String, _>("kind").map_err(ser)?.parse().map_err(ser)?;
    let mode: PoolSelector = row.try_get::<String, _>("mode").map_err(ser)?.parse().map_err(ser)?;
    let feedback: FeedbackTier = row
        .try_get::<String, _>("feedback")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    let result = QuizResult::from_persisted(kind, mode, score, total, feedback, completed_at)
        .map_err(ser)?;
    Ok((id, result))
}
