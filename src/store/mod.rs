mod memory;
mod mongo;

pub use memory::InMemoryBootcampStore;
pub use mongo::{career_stats_pipeline, BootcampStoreMongoAdapter};

use crate::model::{Bootcamp, BootcampInput, CareerStat, StatField};
use crate::service::query::{ListPage, ListQuery};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid bootcamp id {0}")]
    InvalidId(String),

    /// A non-admin owner already has a bootcamp.
    #[error("user {0} already owns a bootcamp")]
    DuplicateOwner(String),

    #[error("duplicate key: {0}")]
    DuplicateField(String),

    #[error("inserted document has no object id")]
    MissingId,

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    #[error(transparent)]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error(transparent)]
    Decode(#[from] mongodb::bson::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Persistence of bootcamp records.
#[async_trait]
pub trait BootcampStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError>;

    /// Any one bootcamp owned by `owner`.
    async fn find_by_owner(&self, owner: &str) -> Result<Option<Bootcamp>, StoreError>;

    /// Stores a new record and returns it with its id. With `exclusive_owner`
    /// the insert fails with [`StoreError::DuplicateOwner`] when the owner
    /// already has an exclusive bootcamp, even under concurrent inserts.
    async fn insert(&self, bootcamp: Bootcamp, exclusive_owner: bool)
        -> Result<Bootcamp, StoreError>;

    /// Sets the fields present in `changes`. `None` when the record is gone.
    async fn update(
        &self,
        id: &str,
        changes: &BootcampInput,
    ) -> Result<Option<Bootcamp>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn list(&self, query: &ListQuery) -> Result<ListPage, StoreError>;

    /// Unwinds `careers` and groups by `field`.
    async fn career_stats(&self, field: StatField) -> Result<Vec<CareerStat>, StoreError>;
}
