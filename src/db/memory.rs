use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use super::Store;

/// In-process store used when no database is configured, and by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: Mutex<FxHashMap<(&'static str, String), serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities across all kinds.
    pub async fn len(&self) -> usize {
        self.entities.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.lock().await.is_empty()
    }

    /// Number of stored entities of one kind.
    pub async fn count(&self, kind: &'static str) -> usize {
        self.entities.lock().await.keys().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_raw(&self, kind: &'static str, id: &str) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(self.entities.lock().await.get(&(kind, id.to_string())).cloned())
    }

    async fn save_raw(&self, kind: &'static str, id: &str, body: serde_json::Value) -> anyhow::Result<()> {
        self.entities.lock().await.insert((kind, id.to_string()), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::db::{load, load_or_create, save, Entity};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        id: String,
        value: u64,
    }

    impl Entity for Counter {
        const KIND: &'static str = "counter";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let counter = Counter { id: "a".to_string(), value: 3 };
        save(&store, &counter).await.unwrap();

        let loaded: Option<Counter> = load(&store, "a").await.unwrap();
        assert_eq!(loaded, Some(counter));
        assert_eq!(load::<Counter, _>(&store, "b").await.unwrap(), None);
        assert_eq!(store.count(Counter::KIND).await, 1);
    }

    #[tokio::test]
    async fn test_load_or_create_reports_creation() {
        let store = MemoryStore::new();
        let (fresh, created) = load_or_create(&store, "a", || Counter { id: "a".to_string(), value: 0 })
            .await
            .unwrap();
        assert!(created);
        assert_eq!(fresh.value, 0);

        save(&store, &Counter { id: "a".to_string(), value: 9 }).await.unwrap();
        let (existing, created) = load_or_create(&store, "a", || Counter { id: "a".to_string(), value: 0 })
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(existing.value, 9);
    }
}
