use crate::error::GatewayResult;
use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use serde_json::{Map, Value};
use std::fmt::Debug;

pub mod memory_store;
pub mod postgres_store;

/// The schemaless body of a document.
pub type Fields = Map<String, Value>;

/// Length of generated document ids, matching the auto-ids of hosted document stores.
pub const DOCUMENT_ID_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// A store of schemaless documents grouped into named collections.
///
/// Implementations are shared between every request for the lifetime of the process, so they
/// must be safe to use concurrently. Writes to the same document race; the last one wins.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    /// Every document in the collection, ordered by id.
    async fn list_all(&self, collection: &str) -> GatewayResult<Vec<Document>>;

    /// Persists `fields` verbatim under a freshly generated id and returns that id.
    async fn create(&self, collection: &str, fields: Fields) -> GatewayResult<String>;

    async fn exists(&self, collection: &str, id: &str) -> GatewayResult<bool>;

    /// Merges `fields` into the top level of an existing document.
    ///
    /// Fails with [`crate::error::GatewayError::MissingDocument`] if there is no such document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> GatewayResult<()>;

    async fn close(&self) {}
}

pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}
