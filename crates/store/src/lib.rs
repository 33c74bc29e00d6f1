//! Record store implementations for Inkwell.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use inkwell_config::DatabaseConfig;
use inkwell_core::error::StoreError;
use inkwell_core::store::{AssessmentStore, StoryStore, UserStore};
use std::sync::Arc;

/// Handles to every record family, all backed by one store instance.
///
/// Built once at startup and handed to the services explicitly.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub assessments: Arc<dyn AssessmentStore>,
    pub stories: Arc<dyn StoryStore>,
}

impl Stores {
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: UserStore + AssessmentStore + StoryStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            assessments: backend.clone(),
            stories: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryStore::new())
    }
}

/// Open the backend named in the configuration.
pub async fn open(config: &DatabaseConfig) -> Result<Stores, StoreError> {
    match config.backend.as_str() {
        "memory" => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            Ok(Stores::in_memory())
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let store = SqliteStore::new(&config.url, config.max_connections).await?;
            Ok(Stores::from_backend(store))
        }
        other => Err(StoreError::Storage(format!(
            "Unsupported store backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_memory_backend() {
        let config = DatabaseConfig {
            backend: "memory".into(),
            ..DatabaseConfig::default()
        };
        let stores = open(&config).await.unwrap();
        assert_eq!(stores.assessments.name(), "in_memory");
    }

    #[tokio::test]
    async fn open_unknown_backend_fails() {
        let config = DatabaseConfig {
            backend: "mongo".into(),
            ..DatabaseConfig::default()
        };
        assert!(open(&config).await.is_err());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn open_sqlite_backend() {
        let config = DatabaseConfig {
            backend: "sqlite".into(),
            url: "sqlite::memory:".into(),
            max_connections: 4,
        };
        let stores = open(&config).await.unwrap();
        assert_eq!(stores.assessments.name(), "sqlite");
    }
}
