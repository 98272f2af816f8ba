//! Generic collection-of-documents store backed by SQLite.
//!
//! Documents are schemaless JSON bodies in a single `documents` table,
//! addressed by `(collection, id)` and queried by top-level field equality
//! via `json_extract`. This is the narrow surface the handlers consume:
//! `find_one`, `get`, `insert`, `set`.
//!
//! Uniqueness checks built on top of this interface are read-then-write and
//! can race across concurrent requests; see DESIGN.md.

use chrono::Utc;
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("document body is not valid JSON: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

pub type DocumentResult<T> = Result<T, DocumentStoreError>;

/// A document read back from a collection.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    fields: String,
}

impl DocumentRow {
    fn into_document(self) -> DocumentResult<Document> {
        Ok(Document {
            id: self.id,
            fields: serde_json::from_str(&self.fields)?,
        })
    }
}

/// Document database handle shared by all handlers.
#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<SqlitePool>,
}

impl DocumentStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Find the first document in `collection` whose top-level `field`
    /// equals `value` (limit 1).
    pub async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> DocumentResult<Option<Document>> {
        // json_extract takes a JSON path; field names here are internal
        // constants, never caller input.
        let path = format!("$.{field}");
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, fields FROM documents
             WHERE collection = ? AND json_extract(fields, ?) = ?
             LIMIT 1",
        )
        .bind(collection)
        .bind(&path)
        .bind(value)
        .fetch_optional(&*self.db)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    /// Fetch a document by its identity.
    pub async fn get(&self, collection: &str, id: &str) -> DocumentResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, fields FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    /// Insert a new document under a generated id and return the id.
    pub async fn insert(&self, collection: &str, fields: &Value) -> DocumentResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO documents (collection, id, fields, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&id)
        .bind(serde_json::to_string(fields)?)
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        debug!(collection, id = %id, "inserted document");
        Ok(id)
    }

    /// Write a document under a chosen id, overwriting any existing body.
    pub async fn set(&self, collection: &str, id: &str, fields: &Value) -> DocumentResult<()> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO documents (collection, id, fields, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET
                 fields = excluded.fields,
                 updated_at = excluded.updated_at",
        )
        .bind(collection)
        .bind(id)
        .bind(serde_json::to_string(fields)?)
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        debug!(collection, id, "set document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> DocumentStore {
        // A single connection keeps every pool checkout on the same
        // in-memory database.
        let db = Arc::new(
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await
                .unwrap(),
        );
        database::run_migrations(&db).await.unwrap();
        DocumentStore::new(db)
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = store().await;
        let id = store
            .insert("authors", &json!({ "name": "Ursula K. Le Guin" }))
            .await
            .unwrap();

        let doc = store.get("authors", &id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.fields["name"], "Ursula K. Le Guin");
    }

    #[tokio::test]
    async fn find_one_matches_on_field_equality() {
        let store = store().await;
        store
            .insert("authors", &json!({ "name": "Tolkien" }))
            .await
            .unwrap();
        store
            .insert("authors", &json!({ "name": "Herbert" }))
            .await
            .unwrap();

        let found = store.find_one("authors", "name", "Herbert").await.unwrap();
        assert_eq!(found.unwrap().fields["name"], "Herbert");

        let missing = store.find_one("authors", "name", "Pratchett").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_one_is_scoped_to_its_collection() {
        let store = store().await;
        store
            .insert("authors", &json!({ "name": "Tolkien" }))
            .await
            .unwrap();

        let found = store.find_one("books", "name", "Tolkien").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn set_creates_and_overwrites() {
        let store = store().await;
        store
            .set("publicProfiles", "frodo", &json!({ "userId": "u1" }))
            .await
            .unwrap();
        store
            .set("publicProfiles", "frodo", &json!({ "userId": "u2" }))
            .await
            .unwrap();

        let doc = store.get("publicProfiles", "frodo").await.unwrap().unwrap();
        assert_eq!(doc.fields["userId"], "u2");
    }
}
