use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use lootshelf_core::store::{
    strip_reserved_keys, validate_field_name, Condition, Document, DocumentFilter, DocumentId,
    DocumentStore, StoreError, StoredDocument,
};

use crate::DbPool;

/// Document store over a single SQLite table holding JSON bodies.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: DbPool,
}

impl SqliteDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn is_available(&self) -> bool {
        !self.pool.is_closed()
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: u32,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        filter.validate()?;

        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, body FROM document WHERE collection = ");
        builder.push_bind(collection);

        // Substring conditions are applied per row below; SQLite's lower() folds ASCII only.
        let mut residual = Vec::new();
        for condition in filter.conditions() {
            let path = json_path(condition.field())?;
            // Only text values take part in either comparison.
            builder.push(" AND json_type(body, ").push_bind(path.clone()).push(") = 'text'");
            match condition {
                Condition::Equals { value, .. } => {
                    builder
                        .push(" AND json_extract(body, ")
                        .push_bind(path)
                        .push(") = ")
                        .push_bind(value.clone());
                }
                Condition::ContainsIgnoreCase { .. } => residual.push(condition),
            }
        }

        builder.push(" ORDER BY seq");
        if residual.is_empty() {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let capacity = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut documents = Vec::new();
        let query = builder.build();
        let mut rows = query.fetch(&self.pool);
        while documents.len() < capacity {
            let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? else {
                break;
            };
            let document = decode_row(&row)?;
            if residual.iter().all(|condition| condition.matches(&document.body)) {
                documents.push(document);
            }
        }

        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query("SELECT id, body FROM document WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError> {
        let path = json_path(field)?;
        let raw_values: Vec<Option<String>> = sqlx::query_scalar(
            "SELECT DISTINCT body -> ? AS value FROM document WHERE collection = ? ORDER BY value",
        )
        .bind(path)
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        raw_values
            .into_iter()
            .flatten()
            .map(|raw| {
                serde_json::from_str::<Value>(&raw)
                    .map_err(|error| StoreError::Decode(format!("distinct `{field}`: {error}")))
            })
            .collect()
    }

    async fn insert_one(
        &self,
        collection: &str,
        body: Document,
    ) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        let encoded = serde_json::to_string(&strip_reserved_keys(body))
            .map_err(|error| StoreError::Decode(error.to_string()))?;

        sqlx::query("INSERT INTO document (id, collection, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(collection)
            .bind(encoded)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(id)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar("SELECT DISTINCT collection FROM document ORDER BY collection")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

fn json_path(field: &str) -> Result<String, StoreError> {
    validate_field_name(field)?;
    Ok(format!("$.{field}"))
}

fn decode_row(row: &SqliteRow) -> Result<StoredDocument, StoreError> {
    let raw_id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let raw_body: String = row.try_get("body").map_err(map_sqlx_error)?;

    let id = DocumentId::parse(&raw_id)
        .ok_or_else(|| StoreError::Decode(format!("stored id `{raw_id}` is malformed")))?;
    let body = match serde_json::from_str::<Value>(&raw_body) {
        Ok(Value::Object(body)) => body,
        Ok(_) => return Err(StoreError::Decode(format!("document {raw_id} is not an object"))),
        Err(error) => return Err(StoreError::Decode(format!("document {raw_id}: {error}"))),
    };

    Ok(StoredDocument { id, body })
}

fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::PoolClosed
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(error.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(error.to_string())
        }
        _ => StoreError::Query(error.to_string()),
    }
}
