use quiz_core::model::{Identity, QuizResult, ResultCategory, ResultId};

use super::SqliteRepository;
use super::mapping::{conn, map_result_row, result_id_from_i64};
use crate::repository::{ResultRepository, ResultRow, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(
        &self,
        identity: &Identity,
        result: &QuizResult,
    ) -> Result<ResultId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    owner, kind, category, mode, score, total, feedback, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(identity.as_str())
        .bind(result.kind().as_str())
        .bind(result.category().as_str())
        .bind(result.mode().as_str())
        .bind(i64::from(result.score()))
        .bind(i64::from(result.total()))
        .bind(result.feedback().as_str())
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        result_id_from_i64(res.last_insert_rowid())
    }

    async fn list_results(
        &self,
        identity: &Identity,
        category: Option<ResultCategory>,
        limit: u32,
    ) -> Result<Vec<ResultRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, kind, mode, score, total, feedback, completed_at
                FROM quiz_results
                WHERE owner = ?1
            ",
        );
        let mut bind_index = 2;
        if category.is_some() {
            sql.push_str(" AND category = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql).bind(identity.as_str());
        if let Some(category) = category {
            query = query.bind(category.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let (id, result) = map_result_row(row)?;
            out.push(ResultRow { id, result });
        }
        Ok(out)
    }
}
