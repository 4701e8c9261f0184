use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::run_pending;
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &["document", "idx_document_collection_seq"];

    #[tokio::test]
    async fn migrations_create_document_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrations");

        for object in MANAGED_SCHEMA_OBJECTS {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE name = ?")
                    .bind(object)
                    .fetch_one(&pool)
                    .await
                    .expect("schema lookup");
            assert_eq!(count, 1, "expected schema object `{object}`");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("migration ledger");
        assert_eq!(applied as usize, MIGRATOR.iter().count());

        pool.close().await;
    }

    #[tokio::test]
    async fn body_must_be_a_json_object() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrations");

        let result = sqlx::query(
            "INSERT INTO document (id, collection, body, created_at) VALUES ('x', 'product', '[1]', '')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err(), "array bodies should be rejected");

        pool.close().await;
    }
}
