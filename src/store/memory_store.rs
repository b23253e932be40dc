use crate::{
    error::{GatewayResult, MissingDocumentSnafu},
    store::{Document, DocumentStore, Fields, generate_document_id},
};
use async_trait::async_trait;
use snafu::OptionExt;
use std::collections::{BTreeMap, HashMap, btree_map::Entry};
use tokio::sync::RwLock;

/// Keeps every collection in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_all(&self, collection: &str) -> GatewayResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Fields) -> GatewayResult<String> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        loop {
            let id = generate_document_id();
            if let Entry::Vacant(vacant) = documents.entry(id.clone()) {
                vacant.insert(fields);
                return Ok(id);
            }
            warn!(%collection, %id, "Generated a document id that was already taken");
        }
    }

    async fn exists(&self, collection: &str, id: &str) -> GatewayResult<bool> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .is_some_and(|documents| documents.contains_key(id)))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .context(MissingDocumentSnafu { collection, id })?;

        document.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> GatewayResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create("students", fields(json!({"name": "Alice", "club": "chess"})))
            .await
            .unwrap();

        let documents = store.list_all("students").await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, id);
        assert_eq!(documents[0].fields["club"], "chess");
    }

    #[tokio::test]
    async fn listing_is_ordered_by_id() {
        let store = MemoryDocumentStore::new();
        for _ in 0..10 {
            store.create("students", Fields::new()).await.unwrap();
        }

        let ids: Vec<String> = store
            .list_all("students")
            .await
            .unwrap()
            .into_iter()
            .map(|document| document.id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        let id = store.create("students", Fields::new()).await.unwrap();

        assert!(store.exists("students", &id).await.unwrap());
        assert!(!store.exists("teachers", &id).await.unwrap());
        assert!(store.list_all("teachers").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create("students", fields(json!({"name": "Alice", "degree": "BSc"})))
            .await
            .unwrap();

        store
            .update("students", &id, fields(json!({"degree": "MSc", "year": 2})))
            .await
            .unwrap();

        let documents = store.list_all("students").await.unwrap();
        assert_eq!(
            documents[0].fields,
            fields(json!({"name": "Alice", "degree": "MSc", "year": 2}))
        );
    }

    #[tokio::test]
    async fn update_of_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update("students", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingDocument { .. }));
    }

    #[tokio::test]
    async fn delete_removes_only_that_document() {
        let store = MemoryDocumentStore::new();
        let doomed = store.create("students", Fields::new()).await.unwrap();
        let kept = store.create("students", Fields::new()).await.unwrap();

        store.delete("students", &doomed).await.unwrap();

        assert!(!store.exists("students", &doomed).await.unwrap());
        assert!(store.exists("students", &kept).await.unwrap());
    }
}
