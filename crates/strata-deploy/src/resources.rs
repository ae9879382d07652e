//! Remote resource model
//!
//! Mirrors of the four resource kinds the platform stores. Each kind names its
//! natural key: the id for groups and datasets, the name for RAW databases and
//! the space identifier for spaces.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use strata_authorization::{Capability, DatasetTarget, GroupDefinition, SpaceTarget};
use strata_core::{Result, StrataError};

/// A remote resource addressable by a natural key
pub trait CachedResource: Clone + Debug + Send + Sync + 'static {
    /// Natural key type
    type Key: Clone + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static;

    /// Resource kind, used in log and error messages
    const KIND: &'static str;

    /// Natural key; fails for items the platform has not assigned one yet
    fn key(&self) -> Result<Self::Key>;

    /// Display name used for target-vs-deployed diffing
    fn name(&self) -> &str;

    /// Record a platform-assigned id; kinds keyed by name ignore it
    fn assign_id(&mut self, _id: i64) {}
}

fn missing_id(kind: &str, name: &str) -> StrataError {
    StrataError::internal(format!("{kind} '{name}' has no platform id"))
}

/// Access-control group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Platform id, absent before creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Group name
    pub name: String,
    /// Capability list
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Identity-provider group id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Identity-provider group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Group {
    /// Unsaved group built from a generated definition
    pub fn from_definition(definition: &GroupDefinition) -> Self {
        Self {
            id: None,
            name: definition.name.clone(),
            capabilities: definition.capabilities.clone(),
            source_id: definition.source.as_ref().map(|s| s.source_id.clone()),
            source: definition.source.as_ref().map(|s| s.source_name.clone()),
        }
    }

    /// Capabilities as an unordered structure
    pub fn capability_set(&self) -> BTreeSet<&Capability> {
        self.capabilities.iter().collect()
    }

    /// Whether two groups grant the same access to the same IdP source
    pub fn is_equivalent(&self, other: &Group) -> bool {
        self.name == other.name
            && self.source_id == other.source_id
            && self.source == other.source
            && self.capability_set() == other.capability_set()
    }
}

impl CachedResource for Group {
    type Key = i64;
    const KIND: &'static str = "group";

    fn key(&self) -> Result<i64> {
        self.id.ok_or_else(|| missing_id(Self::KIND, &self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_id(&mut self, id: i64) {
        self.id.get_or_insert(id);
    }
}

/// Dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSet {
    /// Platform id, absent before creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// External id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Dataset name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Whether writes are restricted to dataset owners
    #[serde(default)]
    pub write_protected: bool,
}

impl DataSet {
    /// Unsaved dataset built from a target
    pub fn from_target(target: &DatasetTarget) -> Self {
        Self {
            id: None,
            external_id: Some(target.external_id.clone()),
            name: target.name.clone(),
            description: Some(target.description.clone()),
            metadata: target.metadata.clone(),
            write_protected: false,
        }
    }

    /// Whether the mutable fields already match the target
    ///
    /// Metadata keys the target does not mention are left alone, so they do
    /// not count as a difference.
    pub fn matches_target(&self, target: &DatasetTarget) -> bool {
        self.external_id.as_deref() == Some(target.external_id.as_str())
            && self.description.as_deref() == Some(target.description.as_str())
            && target
                .metadata
                .iter()
                .all(|(key, value)| self.metadata.get(key) == Some(value))
    }

    /// Copy of this dataset with the target's mutable fields applied
    pub fn with_target(&self, target: &DatasetTarget) -> Self {
        let mut updated = self.clone();
        updated.external_id = Some(target.external_id.clone());
        updated.description = Some(target.description.clone());
        updated.metadata.extend(target.metadata.clone());
        updated
    }
}

impl CachedResource for DataSet {
    type Key = i64;
    const KIND: &'static str = "dataset";

    fn key(&self) -> Result<i64> {
        self.id.ok_or_else(|| missing_id(Self::KIND, &self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_id(&mut self, id: i64) {
        self.id.get_or_insert(id);
    }
}

/// RAW database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDatabase {
    /// Database name
    pub name: String,
}

impl RawDatabase {
    /// Database with this name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CachedResource for RawDatabase {
    type Key = String;
    const KIND: &'static str = "raw database";

    fn key(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Data-model space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Space identifier
    pub space: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Space {
    /// Unsaved space built from a target
    pub fn from_target(target: &SpaceTarget) -> Self {
        Self {
            space: target.space.clone(),
            name: Some(target.name.clone()),
            description: Some(target.description.clone()),
        }
    }
}

impl CachedResource for Space {
    type Key = String;
    const KIND: &'static str = "space";

    fn key(&self) -> Result<String> {
        Ok(self.space.clone())
    }

    fn name(&self) -> &str {
        &self.space
    }
}
