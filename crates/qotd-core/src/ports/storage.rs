//! Storage traits for persistence

use crate::query::ListQuery;
use crate::resource::Resource;
use crate::Result;
use async_trait::async_trait;

/// CRUD contract every storage backend implements for each resource.
///
/// Records handed out are owned copies; mutating them never touches the
/// stored state.
#[async_trait]
pub trait Store<R: Resource>: Send + Sync {
    /// List records, sorted and paginated according to `query`.
    ///
    /// A non-positive limit returns the whole collection. An offset past the
    /// end yields an empty vector.
    async fn list(&self, query: &ListQuery) -> Result<Vec<R>>;

    async fn get_by_id(&self, id: i64) -> Result<R>;

    /// Persist a new record, writing the assigned fields back into `record`.
    async fn create(&self, record: &mut R) -> Result<()>;

    /// Replace the content fields of record `id`. On success `record` holds
    /// the stored state, including the unchanged id.
    async fn update(&self, id: i64, record: &mut R) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;
}
