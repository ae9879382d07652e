//! Roles, resource kinds and the scope context they partition

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Role a generated group plays at its hierarchy position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    /// Read-only access to the position's resources
    Read,
    /// Read/write access plus shared-access grants
    Owner,
    /// Root level, not parameterised by namespace or node
    Admin,
}

impl RoleType {
    /// Roles that are generated for every hierarchy position
    pub const PARAMETERIZED: [RoleType; 2] = [RoleType::Read, RoleType::Owner];

    /// Lowercase name used inside group names
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Read => "read",
            RoleType::Owner => "owner",
            RoleType::Admin => "admin",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource kinds a scope set is partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeCtxType {
    /// Dataset names
    Dataset,
    /// RAW database names
    RawDb,
    /// Data-model space identifiers
    Space,
    /// Group names
    Group,
}

impl ScopeCtxType {
    /// Every kind, in bucket order
    pub const ALL: [ScopeCtxType; 4] = [
        ScopeCtxType::Dataset,
        ScopeCtxType::RawDb,
        ScopeCtxType::Space,
        ScopeCtxType::Group,
    ];
}

/// Resource names of one role, partitioned by kind
///
/// Every kind is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeBuckets {
    buckets: BTreeMap<ScopeCtxType, BTreeSet<String>>,
}

impl Default for ScopeBuckets {
    fn default() -> Self {
        Self {
            buckets: ScopeCtxType::ALL
                .iter()
                .map(|kind| (*kind, BTreeSet::new()))
                .collect(),
        }
    }
}

impl ScopeBuckets {
    /// Names of one kind
    pub fn get(&self, kind: ScopeCtxType) -> &BTreeSet<String> {
        // Default fills every kind, so the map lookup always succeeds.
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.buckets.get(&kind).unwrap_or(&EMPTY)
    }

    /// Add names to one kind
    pub fn extend<I, S>(&mut self, kind: ScopeCtxType, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buckets
            .entry(kind)
            .or_default()
            .extend(names.into_iter().map(Into::into));
    }

    /// Union another bucket set into this one
    pub fn merge(&mut self, other: &ScopeBuckets) {
        for (kind, names) in &other.buckets {
            self.extend(*kind, names.iter().cloned());
        }
    }

    /// True when both the RAW database and dataset kinds are empty
    pub fn is_resource_empty(&self) -> bool {
        self.get(ScopeCtxType::RawDb).is_empty() && self.get(ScopeCtxType::Dataset).is_empty()
    }

    /// True when every kind is empty
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeSet::is_empty)
    }
}

/// Scope sets of a hierarchy position, keyed by role
///
/// Always carries exactly the OWNER and READ keys so consumers can iterate
/// both sides without existence checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeContext {
    owner: ScopeBuckets,
    read: ScopeBuckets,
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeContext {
    /// Empty context with both role keys present
    pub fn new() -> Self {
        Self {
            owner: ScopeBuckets::default(),
            read: ScopeBuckets::default(),
        }
    }

    /// Buckets for a role; ADMIN has no buckets and maps onto OWNER
    pub fn role(&self, role: RoleType) -> &ScopeBuckets {
        match role {
            RoleType::Read => &self.read,
            RoleType::Owner | RoleType::Admin => &self.owner,
        }
    }

    /// Mutable buckets for a role
    pub fn role_mut(&mut self, role: RoleType) -> &mut ScopeBuckets {
        match role {
            RoleType::Read => &mut self.read,
            RoleType::Owner | RoleType::Admin => &mut self.owner,
        }
    }

    /// Both sides in OWNER, READ order
    pub fn iter(&self) -> impl Iterator<Item = (RoleType, &ScopeBuckets)> {
        [(RoleType::Owner, &self.owner), (RoleType::Read, &self.read)].into_iter()
    }
}
