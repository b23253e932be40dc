use crate::{
    config::{RuntimeConfiguration, StoreBackend},
    error::GatewayResult,
    store::{
        DocumentStore, memory_store::MemoryDocumentStore, postgres_store::PostgresDocumentStore,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct GatewayState {
    store: Arc<dyn DocumentStore>,
    collection: Arc<str>,
}

impl GatewayState {
    pub async fn new(config: &RuntimeConfiguration) -> GatewayResult<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_backend() {
            StoreBackend::Postgres(db_config) => {
                let options = PgPoolOptions::new().max_connections(db_config.max_connections());
                Arc::new(PostgresDocumentStore::connect(options, db_config).await?)
            }
            StoreBackend::Memory => {
                warn!("Using the in-memory store, nothing will be persisted");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(store, config.collection()))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self {
            store,
            collection: Arc::from(collection),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
    }
}

impl Deref for GatewayState {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
