//! Deployed-state cache
//!
//! A keyed mirror of what the platform already holds. It is filled once per
//! command by a full listing and then mutated in lockstep with every remote
//! call; it is never re-fetched mid-run except after the dataset settle delay.

use crate::effects::{PlatformEffects, ResourceApi};
use crate::resources::{CachedResource, DataSet, Group, RawDatabase, Space};
use indexmap::IndexMap;
use strata_authorization::DatasetIdResolver;
use strata_core::Result;
use tracing::{debug, warn};

/// Items of one resource kind indexed by natural key
#[derive(Debug, Clone)]
pub struct DeployedCache<T: CachedResource> {
    items: IndexMap<T::Key, T>,
}

impl<T: CachedResource> Default for DeployedCache<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: CachedResource> DeployedCache<T> {
    /// Cache holding `items`
    pub fn from_items(items: Vec<T>) -> Result<Self> {
        let mut cache = Self::default();
        cache.create(items)?;
        Ok(cache)
    }

    /// Replace the contents with a full listing from the platform
    pub async fn refresh<A>(&mut self, api: &A) -> Result<()>
    where
        A: ResourceApi<T> + ?Sized,
    {
        let items = api.list().await?;
        self.items.clear();
        self.create(items)?;
        debug!(kind = T::KIND, count = self.items.len(), "refreshed deployed cache");
        Ok(())
    }

    /// Items whose key is in `keys`
    pub fn select(&self, keys: &[T::Key]) -> Vec<&T> {
        keys.iter().filter_map(|key| self.items.get(key)).collect()
    }

    /// Items with this display name
    pub fn select_by_name(&self, name: &str) -> Vec<&T> {
        self.items.values().filter(|item| item.name() == name).collect()
    }

    /// Insert items; an existing item with the same key is replaced
    pub fn create(&mut self, items: Vec<T>) -> Result<()> {
        for item in items {
            self.items.insert(item.key()?, item);
        }
        Ok(())
    }

    /// Replace items: delete by key, then create
    pub fn update(&mut self, items: Vec<T>) -> Result<()> {
        let keys = items
            .iter()
            .map(CachedResource::key)
            .collect::<Result<Vec<_>>>()?;
        self.delete(&keys);
        self.create(items)
    }

    /// Remove the items whose key is in `keys`, returning them
    pub fn delete(&mut self, keys: &[T::Key]) -> Vec<T> {
        keys.iter()
            .filter_map(|key| self.items.shift_remove(key))
            .collect()
    }

    /// Display names in insertion order
    pub fn get_names(&self) -> Vec<String> {
        self.items.values().map(|item| item.name().to_string()).collect()
    }

    /// Whether an item with this display name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.items.values().any(|item| item.name() == name)
    }

    /// Every cached item
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Number of cached items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DeployedCache<DataSet> {
    /// The dataset with this name; among duplicates the lowest id wins
    pub fn dataset_by_name(&self, name: &str) -> Option<&DataSet> {
        let matches = self.select_by_name(name);
        if matches.len() > 1 {
            let ids: Vec<Option<i64>> = matches.iter().map(|dataset| dataset.id).collect();
            warn!(name = %name, ids = ?ids, "dataset name is ambiguous, using the lowest id");
        }
        matches.into_iter().min_by_key(|dataset| dataset.id)
    }
}

impl DatasetIdResolver for DeployedCache<DataSet> {
    fn dataset_id(&self, name: &str) -> Option<i64> {
        self.dataset_by_name(name).and_then(|dataset| dataset.id)
    }
}

/// Caches of every resource kind, owned by one command invocation
#[derive(Debug, Clone, Default)]
pub struct DeployedState {
    /// Deployed groups
    pub groups: DeployedCache<Group>,
    /// Deployed datasets
    pub datasets: DeployedCache<DataSet>,
    /// Deployed RAW databases
    pub raw_dbs: DeployedCache<RawDatabase>,
    /// Deployed spaces
    pub spaces: DeployedCache<Space>,
}

impl DeployedState {
    /// List every resource kind from the platform
    pub async fn load<P: PlatformEffects + ?Sized>(platform: &P) -> Result<Self> {
        let mut state = Self::default();
        state.groups.refresh(platform).await?;
        state.datasets.refresh(platform).await?;
        state.raw_dbs.refresh(platform).await?;
        state.spaces.refresh(platform).await?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(id: i64, name: &str) -> DataSet {
        DataSet {
            id: Some(id),
            external_id: Some(name.to_string()),
            name: name.to_string(),
            description: None,
            metadata: Default::default(),
            write_protected: false,
        }
    }

    #[test]
    fn test_select_and_delete_by_key() {
        let mut cache =
            DeployedCache::from_items(vec![dataset(1, "a:dataset"), dataset(2, "b:dataset")])
                .unwrap();
        assert_eq!(cache.select(&[2, 3]).len(), 1);
        let removed = cache.delete(&[1]);
        assert_eq!(removed[0].name, "a:dataset");
        assert_eq!(cache.get_names(), vec!["b:dataset"]);
    }

    #[test]
    fn test_update_replaces_item() {
        let mut cache = DeployedCache::from_items(vec![dataset(1, "a:dataset")]).unwrap();
        let mut changed = dataset(1, "a:dataset");
        changed.description = Some("changed".to_string());
        cache.update(vec![changed]).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.select(&[1])[0].description.as_deref(),
            Some("changed")
        );
    }

    #[test]
    fn test_dataset_cache_resolves_ids_by_name() {
        let cache = DeployedCache::from_items(vec![dataset(5, "a:dataset")]).unwrap();
        assert_eq!(cache.dataset_id("a:dataset"), Some(5));
        assert_eq!(cache.dataset_id("b:dataset"), None);
    }

    #[test]
    fn test_duplicate_dataset_names_resolve_to_lowest_id() {
        let cache = DeployedCache::from_items(vec![
            dataset(9, "a:dataset"),
            dataset(3, "a:dataset"),
            dataset(5, "b:dataset"),
        ])
        .unwrap();
        assert_eq!(cache.dataset_id("a:dataset"), Some(3));
        assert_eq!(cache.dataset_by_name("a:dataset").and_then(|d| d.id), Some(3));
        assert_eq!(cache.dataset_id("b:dataset"), Some(5));
    }

    #[test]
    fn test_name_keyed_kinds() {
        let mut cache = DeployedCache::from_items(vec![RawDatabase::new("a:rawdb")]).unwrap();
        assert!(cache.contains_name("a:rawdb"));
        cache.delete(&["a:rawdb".to_string()]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unsaved_items_are_rejected() {
        let mut unsaved = dataset(1, "a:dataset");
        unsaved.id = None;
        assert!(DeployedCache::from_items(vec![unsaved]).is_err());
    }
}
