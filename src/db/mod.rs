use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Persistence collaborator for the accounting engine.
///
/// Entities are stored as JSON bodies keyed by `(kind, id)`. Keys are
/// deterministic (pair + bin id, tx + log index, bucket id) so saving the
/// same entity twice overwrites rather than duplicates.
///
/// The engine performs strict read-modify-write per entity and never has
/// two events in flight, so implementations need no cross-entity locking.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load_raw(&self, kind: &'static str, id: &str) -> anyhow::Result<Option<serde_json::Value>>;

    async fn save_raw(&self, kind: &'static str, id: &str, body: serde_json::Value) -> anyhow::Result<()>;
}

/// A persisted entity type.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Table-like namespace the entity lives in
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Load an entity by id.
pub async fn load<E: Entity, S: Store + ?Sized>(store: &S, id: &str) -> anyhow::Result<Option<E>> {
    match store.load_raw(E::KIND, id).await? {
        Some(body) => {
            let entity = serde_json::from_value(body)
                .with_context(|| format!("Failed to decode {} {}", E::KIND, id))?;
            Ok(Some(entity))
        },
        None => Ok(None),
    }
}

/// Persist an entity, replacing any previous body under the same id.
pub async fn save<E: Entity, S: Store + ?Sized>(store: &S, entity: &E) -> anyhow::Result<()> {
    let body = serde_json::to_value(entity)
        .with_context(|| format!("Failed to encode {} {}", E::KIND, entity.id()))?;
    store.save_raw(E::KIND, entity.id(), body).await
}

/// Load an entity, or build its zero value when it does not exist yet.
///
/// The second element is `true` when the entity was just created. Nothing
/// is persisted here; callers save once they finish mutating.
pub async fn load_or_create<E, S, F>(store: &S, id: &str, init: F) -> anyhow::Result<(E, bool)>
where
    E: Entity,
    S: Store + ?Sized,
    F: FnOnce() -> E,
{
    match load::<E, S>(store, id).await? {
        Some(entity) => Ok((entity, false)),
        None => Ok((init(), true)),
    }
}
