use crate::{
    config::DbConfig,
    error::{
        GatewayResult, GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu,
        MissingDocumentSnafu, OpenDatabaseSnafu,
    },
    store::{Document, DocumentStore, Fields, generate_document_id},
};
use async_trait::async_trait;
use snafu::{ResultExt, ensure};
use sqlx::{
    Pool, Postgres,
    pool::PoolConnection,
    postgres::PgPoolOptions,
    types::Json,
};

/// Documents live in a single `documents` table keyed by `(collection, id)`, with the body as
/// `JSONB`.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Pool<Postgres>,
}

impl PostgresDocumentStore {
    pub async fn connect(options: PgPoolOptions, db_config: &DbConfig) -> GatewayResult<Self> {
        let pool = options
            .connect(&db_config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        Self::from_pool(pool).await
    }

    /// Brings the schema up to date before handing out the store.
    pub async fn from_pool(pool: Pool<Postgres>) -> GatewayResult<Self> {
        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> GatewayResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn list_all(&self, collection: &str) -> GatewayResult<Vec<Document>> {
        let mut conn = self.get_connection().await?;

        let rows: Vec<(String, Json<Fields>)> = sqlx::query_as(
            "SELECT id, fields FROM documents WHERE collection = $1 ORDER BY id COLLATE \"C\"",
        )
        .bind(collection)
        .fetch_all(&mut *conn)
        .await
        .context(MakeQuerySnafu)?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(fields))| Document { id, fields })
            .collect())
    }

    async fn create(&self, collection: &str, fields: Fields) -> GatewayResult<String> {
        let mut conn = self.get_connection().await?;
        let fields = Json(fields);

        loop {
            let id = generate_document_id();
            let inserted = sqlx::query(
                "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3) ON CONFLICT (collection, id) DO NOTHING",
            )
            .bind(collection)
            .bind(&id)
            .bind(&fields)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected();

            if inserted == 1 {
                return Ok(id);
            }
            warn!(%collection, %id, "Generated a document id that was already taken");
        }
    }

    async fn exists(&self, collection: &str, id: &str) -> GatewayResult<bool> {
        let mut conn = self.get_connection().await?;

        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND id = $2)",
        )
        .bind(collection)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()> {
        let mut conn = self.get_connection().await?;

        let updated = sqlx::query(
            "UPDATE documents SET fields = fields || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(fields))
        .execute(&mut *conn)
        .await
        .context(MakeQuerySnafu)?
        .rows_affected();

        ensure!(updated == 1, MissingDocumentSnafu { collection, id });
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> GatewayResult<()> {
        let mut conn = self.get_connection().await?;

        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// These run against a real server and are skipped unless `DATABASE_URL` points at one.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use serde_json::{Value, json};

    async fn store() -> Option<PostgresDocumentStore> {
        let Ok(url) = dotenvy::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping postgres test");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("unable to connect to DATABASE_URL");
        Some(
            PostgresDocumentStore::from_pool(pool)
                .await
                .expect("unable to migrate"),
        )
    }

    /// A collection nobody else writes to, so tests don't see each other's rows.
    fn scratch_collection() -> String {
        format!("test_{}", generate_document_id())
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn create_list_and_exists() {
        let Some(store) = store().await else { return };
        let collection = scratch_collection();

        let id = store
            .create(&collection, fields(json!({"name": "Alice", "year": 2})))
            .await
            .unwrap();

        assert!(store.exists(&collection, &id).await.unwrap());
        assert!(!store.exists(&collection, "missing").await.unwrap());
        assert_eq!(
            store.list_all(&collection).await.unwrap(),
            vec![Document {
                id,
                fields: fields(json!({"name": "Alice", "year": 2})),
            }]
        );
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let Some(store) = store().await else { return };
        let collection = scratch_collection();
        let id = store
            .create(&collection, fields(json!({"name": "Alice", "degree": "BSc"})))
            .await
            .unwrap();

        store
            .update(&collection, &id, fields(json!({"degree": "MSc", "rollNo": 102})))
            .await
            .unwrap();

        let documents = store.list_all(&collection).await.unwrap();
        assert_eq!(
            documents[0].fields,
            fields(json!({"name": "Alice", "degree": "MSc", "rollNo": 102}))
        );
    }

    #[tokio::test]
    async fn update_of_missing_document_fails() {
        let Some(store) = store().await else { return };

        let err = store
            .update(&scratch_collection(), "missing", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingDocument { .. }));
    }

    #[tokio::test]
    async fn listing_is_ordered_and_delete_is_scoped() {
        let Some(store) = store().await else { return };
        let collection = scratch_collection();
        let other = scratch_collection();

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.create(&collection, Fields::new()).await.unwrap());
        }
        let elsewhere = store.create(&other, Fields::new()).await.unwrap();

        store.delete(&collection, &ids[0]).await.unwrap();
        store.delete(&collection, &elsewhere).await.unwrap();

        let mut expected = ids[1..].to_vec();
        expected.sort();
        let listed: Vec<String> = store
            .list_all(&collection)
            .await
            .unwrap()
            .into_iter()
            .map(|document| document.id)
            .collect();
        assert_eq!(listed, expected);
        assert!(store.exists(&other, &elsewhere).await.unwrap());
    }
}
