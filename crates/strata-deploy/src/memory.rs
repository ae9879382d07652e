//! In-memory platform
//!
//! A complete [`PlatformEffects`](crate::effects::PlatformEffects)
//! implementation backed by shared in-process state. Ids are assigned from a
//! monotonically increasing counter. The state can be persisted as a JSON
//! snapshot, which lets the CLI run against a local file instead of a live
//! project.

use crate::effects::ResourceApi;
use crate::resources::{CachedResource, DataSet, Group, RawDatabase, Space};
use async_lock::RwLock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use strata_core::{Result, StrataError};
use tracing::debug;

/// Serialisable platform contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    /// Last id handed out
    #[serde(default)]
    pub last_id: i64,
    /// Groups
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Datasets
    #[serde(default)]
    pub datasets: Vec<DataSet>,
    /// RAW databases
    #[serde(default)]
    pub raw_dbs: Vec<RawDatabase>,
    /// Spaces
    #[serde(default)]
    pub spaces: Vec<Space>,
}

/// Resource kinds stored in a [`PlatformSnapshot`]
pub trait MemoryTable: CachedResource {
    /// Creating an existing key overwrites it instead of failing
    const UPSERT: bool = false;

    /// Items of this kind
    fn table(snapshot: &PlatformSnapshot) -> &[Self];

    /// Mutable items of this kind
    fn table_mut(snapshot: &mut PlatformSnapshot) -> &mut Vec<Self>;

    /// Platform-side uniqueness rules beyond the key
    fn check_create(_existing: &[Self], _item: &Self) -> Result<()> {
        Ok(())
    }
}

impl MemoryTable for Group {
    fn table(snapshot: &PlatformSnapshot) -> &[Self] {
        &snapshot.groups
    }

    fn table_mut(snapshot: &mut PlatformSnapshot) -> &mut Vec<Self> {
        &mut snapshot.groups
    }
}

impl MemoryTable for DataSet {
    fn table(snapshot: &PlatformSnapshot) -> &[Self] {
        &snapshot.datasets
    }

    fn table_mut(snapshot: &mut PlatformSnapshot) -> &mut Vec<Self> {
        &mut snapshot.datasets
    }

    fn check_create(existing: &[Self], item: &Self) -> Result<()> {
        match &item.external_id {
            Some(external_id)
                if existing
                    .iter()
                    .any(|d| d.external_id.as_ref() == Some(external_id)) =>
            {
                Err(StrataError::remote(format!(
                    "dataset external id '{external_id}' already exists"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl MemoryTable for RawDatabase {
    fn table(snapshot: &PlatformSnapshot) -> &[Self] {
        &snapshot.raw_dbs
    }

    fn table_mut(snapshot: &mut PlatformSnapshot) -> &mut Vec<Self> {
        &mut snapshot.raw_dbs
    }
}

impl MemoryTable for Space {
    const UPSERT: bool = true;

    fn table(snapshot: &PlatformSnapshot) -> &[Self] {
        &snapshot.spaces
    }

    fn table_mut(snapshot: &mut PlatformSnapshot) -> &mut Vec<Self> {
        &mut snapshot.spaces
    }
}

/// Platform held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    state: Arc<RwLock<PlatformSnapshot>>,
}

impl MemoryPlatform {
    /// Empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform seeded with a snapshot
    pub fn with_snapshot(snapshot: PlatformSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Load a JSON snapshot; a missing file yields an empty platform
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| StrataError::from(e).context(format!("state file {}", path.display())))?;
        let snapshot: PlatformSnapshot = serde_json::from_str(&content)?;
        Ok(Self::with_snapshot(snapshot))
    }

    /// Write the current contents as a JSON snapshot
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.state.read().await)?;
        std::fs::write(path, content)
            .map_err(|e| StrataError::from(e).context(format!("state file {}", path.display())))?;
        debug!(path = %path.display(), "saved platform state");
        Ok(())
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> PlatformSnapshot {
        self.state.read().await.clone()
    }
}

fn position<R: CachedResource>(table: &[R], key: &R::Key) -> Option<usize> {
    table
        .iter()
        .position(|item| item.key().ok().as_ref() == Some(key))
}

#[async_trait]
impl<R: MemoryTable> ResourceApi<R> for MemoryPlatform {
    async fn list(&self) -> Result<Vec<R>> {
        Ok(R::table(&*self.state.read().await).to_vec())
    }

    async fn create(&self, items: Vec<R>) -> Result<Vec<R>> {
        let mut state = self.state.write().await;
        let mut created = Vec::with_capacity(items.len());
        for mut item in items {
            R::check_create(R::table(&state), &item)?;
            state.last_id += 1;
            item.assign_id(state.last_id);
            let key = item.key()?;
            let table = R::table_mut(&mut state);
            match position(table, &key) {
                Some(idx) if R::UPSERT => table[idx] = item.clone(),
                Some(_) => {
                    return Err(StrataError::remote(format!(
                        "{} '{key}' already exists",
                        R::KIND
                    )))
                }
                None => table.push(item.clone()),
            }
            created.push(item);
        }
        Ok(created)
    }

    async fn update(&self, items: Vec<R>) -> Result<Vec<R>> {
        let mut state = self.state.write().await;
        let table = R::table_mut(&mut state);
        for item in &items {
            let key = item.key()?;
            let idx = position(table, &key)
                .ok_or_else(|| StrataError::not_found(format!("{} '{key}'", R::KIND)))?;
            table[idx] = item.clone();
        }
        Ok(items)
    }

    async fn delete(&self, keys: Vec<R::Key>, recursive: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let table = R::table_mut(&mut state);
        for key in &keys {
            let idx = position(table, key)
                .ok_or_else(|| StrataError::not_found(format!("{} '{key}'", R::KIND)))?;
            table.remove(idx);
        }
        debug!(kind = R::KIND, count = keys.len(), recursive, "deleted from memory platform");
        Ok(())
    }
}
