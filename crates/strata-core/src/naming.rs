//! Naming template engine
//!
//! Pure functions mapping a node identifier and a resource kind onto the
//! canonical resource name. A [`NamingScheme`] is built once per run from the
//! feature flags and passed to every consumer, so every name generated in one
//! invocation follows the same scheme.

use crate::config::Features;
use crate::scope::{RoleType, ScopeBuckets, ScopeCtxType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchy position of a generated group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum GroupLevel {
    /// One node of one namespace
    Node {
        /// Group role
        role: RoleType,
        /// Namespace of the node
        ns_name: String,
        /// Node name
        node_name: String,
    },
    /// Aggregate of one namespace
    Namespace {
        /// Group role
        role: RoleType,
        /// Namespace name
        ns_name: String,
    },
    /// Aggregate of the whole configuration
    Top {
        /// Group role
        role: RoleType,
    },
    /// Root/admin account
    Root,
}

impl GroupLevel {
    /// Role of the group; root groups are ADMIN
    pub fn role(&self) -> RoleType {
        match self {
            GroupLevel::Node { role, .. }
            | GroupLevel::Namespace { role, .. }
            | GroupLevel::Top { role } => *role,
            GroupLevel::Root => RoleType::Admin,
        }
    }
}

impl fmt::Display for GroupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLevel::Node { node_name, .. } => write!(f, "node {node_name}"),
            GroupLevel::Namespace { ns_name, .. } => write!(f, "namespace {ns_name}"),
            GroupLevel::Top { .. } => f.write_str("top"),
            GroupLevel::Root => f.write_str("root"),
        }
    }
}

/// Replace every character outside `[a-zA-Z0-9_-]` with `-`
pub fn sanitize_space_id(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Immutable naming configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    group_prefix: String,
    aggregated_level_name: String,
    dataset_suffix: String,
    rawdb_suffix: String,
    rawdb_variants: Vec<String>,
    space_suffix: String,
    root_account: String,
    with_rawdbs: bool,
    with_spaces: bool,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self::from_features(&Features::default())
    }
}

impl NamingScheme {
    /// Build the scheme from feature flags
    pub fn from_features(features: &Features) -> Self {
        Self {
            group_prefix: features.group_prefix.clone(),
            aggregated_level_name: features.aggregated_level_name.clone(),
            dataset_suffix: features.dataset_suffix.clone(),
            rawdb_suffix: features.rawdb_suffix.clone(),
            rawdb_variants: features.rawdb_variants.clone(),
            space_suffix: features.space_suffix.clone(),
            root_account: features.root_account.clone(),
            with_rawdbs: features.with_raw_capability,
            with_spaces: features.with_datamodel_capability,
        }
    }

    /// Whether RAW databases are generated
    pub fn with_rawdbs(&self) -> bool {
        self.with_rawdbs
    }

    /// Whether spaces are generated
    pub fn with_spaces(&self) -> bool {
        self.with_spaces
    }

    /// Name of the synthetic aggregate level
    pub fn aggregated_level_name(&self) -> &str {
        &self.aggregated_level_name
    }

    /// `{ns_name}:{aggregated_level_name}`
    pub fn ns_aggregate(&self, ns_name: &str) -> String {
        format!("{ns_name}:{}", self.aggregated_level_name)
    }

    /// `{aggregated_level_name}`
    pub fn top_aggregate(&self) -> String {
        self.aggregated_level_name.clone()
    }

    /// Dataset name of a node
    pub fn dataset_name(&self, node_name: &str) -> String {
        format!("{node_name}{}", self.dataset_suffix)
    }

    /// RAW database names of a node, one per variant
    pub fn rawdb_names(&self, node_name: &str) -> Vec<String> {
        self.rawdb_variants
            .iter()
            .map(|variant| format!("{node_name}{}{variant}", self.rawdb_suffix))
            .collect()
    }

    /// Unsanitized space display name of a node
    pub fn space_name(&self, node_name: &str) -> String {
        format!("{node_name}{}", self.space_suffix)
    }

    /// Space identifier of a node
    pub fn space_id(&self, node_name: &str) -> String {
        sanitize_space_id(&self.space_name(node_name))
    }

    /// Every enabled resource name of one node, partitioned by kind
    pub fn node_resources(&self, node_name: &str) -> ScopeBuckets {
        let mut buckets = ScopeBuckets::default();
        buckets.extend(ScopeCtxType::Dataset, [self.dataset_name(node_name)]);
        if self.with_rawdbs {
            buckets.extend(ScopeCtxType::RawDb, self.rawdb_names(node_name));
        }
        if self.with_spaces {
            buckets.extend(ScopeCtxType::Space, [self.space_id(node_name)]);
        }
        buckets
    }

    /// Group name of a hierarchy position
    pub fn group_name(&self, level: &GroupLevel) -> String {
        let prefix = &self.group_prefix;
        match level {
            GroupLevel::Node {
                role, node_name, ..
            } => format!("{prefix}{node_name}:{role}"),
            GroupLevel::Namespace { role, ns_name } => {
                format!("{prefix}{}:{role}", self.ns_aggregate(ns_name))
            }
            GroupLevel::Top { role } => format!("{prefix}{}:{role}", self.aggregated_level_name),
            GroupLevel::Root => format!("{prefix}{}", self.root_account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resource_names() {
        let naming = NamingScheme::default();
        assert_eq!(naming.dataset_name("src:001:sap"), "src:001:sap:dataset");
        assert_eq!(
            naming.rawdb_names("src:001:sap"),
            vec!["src:001:sap:rawdb", "src:001:sap:rawdb:state"]
        );
        assert_eq!(naming.space_id("src:001:sap"), "src-001-sap-space");
        assert_eq!(naming.ns_aggregate("src"), "src:allprojects");
        assert_eq!(naming.top_aggregate(), "allprojects");
    }

    #[test]
    fn test_sanitize_space_id() {
        assert_eq!(sanitize_space_id("a b.c/d_e-f9"), "a-b-c-d_e-f9");
        assert_eq!(sanitize_space_id("ünï"), "-n-");
    }

    #[test]
    fn test_group_names() {
        let naming = NamingScheme::default();
        let node = GroupLevel::Node {
            role: RoleType::Owner,
            ns_name: "src".to_string(),
            node_name: "src:001:sap".to_string(),
        };
        assert_eq!(naming.group_name(&node), "cdf:src:001:sap:owner");
        let ns = GroupLevel::Namespace {
            role: RoleType::Read,
            ns_name: "src".to_string(),
        };
        assert_eq!(naming.group_name(&ns), "cdf:src:allprojects:read");
        let top = GroupLevel::Top {
            role: RoleType::Owner,
        };
        assert_eq!(naming.group_name(&top), "cdf:allprojects:owner");
        assert_eq!(naming.group_name(&GroupLevel::Root), "cdf:root");
    }

    #[test]
    fn test_disabled_kinds_are_not_generated() {
        let features = Features {
            with_raw_capability: false,
            with_datamodel_capability: false,
            ..Features::default()
        };
        let naming = NamingScheme::from_features(&features);
        let buckets = naming.node_resources("uc:001");
        assert_eq!(buckets.get(ScopeCtxType::Dataset).len(), 1);
        assert!(buckets.get(ScopeCtxType::RawDb).is_empty());
        assert!(buckets.get(ScopeCtxType::Space).is_empty());
    }

    #[test]
    fn test_custom_variants_and_prefix() {
        let features = Features {
            group_prefix: "grp-".to_string(),
            rawdb_variants: vec![":a".to_string(), ":b".to_string(), ":c".to_string()],
            ..Features::default()
        };
        let naming = NamingScheme::from_features(&features);
        assert_eq!(naming.rawdb_names("n").len(), 3);
        assert_eq!(naming.group_name(&GroupLevel::Root), "grp-root");
    }
}
