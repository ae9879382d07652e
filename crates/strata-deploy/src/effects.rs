//! Remote platform effect traits
//!
//! The platform is reached only through these traits. Every call is awaited
//! before the next one is issued; retries and backoff belong to the
//! implementation, not to the callers.

use crate::resources::{CachedResource, DataSet, Group, RawDatabase, Space};
use async_trait::async_trait;
use strata_core::Result;

/// CRUD operations for one resource kind
#[async_trait]
pub trait ResourceApi<R: CachedResource>: Send + Sync {
    /// Every item of this kind, without paging limits
    async fn list(&self) -> Result<Vec<R>>;

    /// Create items, returning them with platform-assigned ids
    async fn create(&self, items: Vec<R>) -> Result<Vec<R>>;

    /// Overwrite existing items, matched by key
    async fn update(&self, items: Vec<R>) -> Result<Vec<R>>;

    /// Delete items by key; `recursive` also removes contained data
    async fn delete(&self, keys: Vec<R::Key>, recursive: bool) -> Result<()>;
}

/// Every resource kind the bootstrap engine manages
pub trait PlatformEffects:
    ResourceApi<Group> + ResourceApi<DataSet> + ResourceApi<RawDatabase> + ResourceApi<Space>
{
}

impl<T> PlatformEffects for T where
    T: ResourceApi<Group>
        + ResourceApi<DataSet>
        + ResourceApi<RawDatabase>
        + ResourceApi<Space>
        + ?Sized
{
}
