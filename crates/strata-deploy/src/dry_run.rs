//! Dry-run decorator
//!
//! Listings go to the wrapped platform; mutations are only logged and echoed
//! back. Created items that need an id get a synthetic negative one, so the
//! rest of a run (group generation in particular) can proceed unchanged.

use crate::effects::ResourceApi;
use crate::resources::CachedResource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use strata_core::Result;
use tracing::info;

/// Read-through, write-nothing view of a platform
#[derive(Debug)]
pub struct DryRunPlatform<'a, P: ?Sized> {
    inner: &'a P,
    next_id: AtomicI64,
}

impl<'a, P: ?Sized> DryRunPlatform<'a, P> {
    /// Wrap `inner`
    pub fn new(inner: &'a P) -> Self {
        Self {
            inner,
            next_id: AtomicI64::new(-1),
        }
    }

    fn synthetic_id(&self) -> i64 {
        self.next_id.fetch_sub(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl<'a, P, R> ResourceApi<R> for DryRunPlatform<'a, P>
where
    P: ResourceApi<R> + ?Sized,
    R: CachedResource,
{
    async fn list(&self) -> Result<Vec<R>> {
        self.inner.list().await
    }

    async fn create(&self, items: Vec<R>) -> Result<Vec<R>> {
        let mut created = Vec::with_capacity(items.len());
        for mut item in items {
            item.assign_id(self.synthetic_id());
            info!(kind = R::KIND, name = item.name(), "dry run: would create");
            created.push(item);
        }
        Ok(created)
    }

    async fn update(&self, items: Vec<R>) -> Result<Vec<R>> {
        for item in &items {
            info!(kind = R::KIND, name = item.name(), "dry run: would update");
        }
        Ok(items)
    }

    async fn delete(&self, keys: Vec<R::Key>, recursive: bool) -> Result<()> {
        for key in &keys {
            info!(kind = R::KIND, key = %key, recursive, "dry run: would delete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPlatform;
    use crate::resources::{Group, RawDatabase};

    #[tokio::test]
    async fn test_mutations_do_not_reach_inner_platform() {
        let inner = MemoryPlatform::new();
        let dry = DryRunPlatform::new(&inner);

        let created = ResourceApi::<Group>::create(
            &dry,
            vec![Group {
                id: None,
                name: "cdf:root".to_string(),
                capabilities: Vec::new(),
                source_id: None,
                source: None,
            }],
        )
        .await
        .unwrap();
        assert_eq!(created[0].id, Some(-1));

        ResourceApi::<RawDatabase>::create(&dry, vec![RawDatabase::new("a:rawdb")])
            .await
            .unwrap();
        ResourceApi::<Group>::delete(&dry, vec![3], false).await.unwrap();

        let snapshot = inner.snapshot().await;
        assert!(snapshot.groups.is_empty());
        assert!(snapshot.raw_dbs.is_empty());
    }

    #[tokio::test]
    async fn test_listing_reads_through() {
        let inner = MemoryPlatform::new();
        ResourceApi::<RawDatabase>::create(&inner, vec![RawDatabase::new("a:rawdb")])
            .await
            .unwrap();
        let dry = DryRunPlatform::new(&inner);
        let listed = ResourceApi::<RawDatabase>::list(&dry).await.unwrap();
        assert_eq!(listed, vec![RawDatabase::new("a:rawdb")]);
    }
}
