//! Declarative bootstrap configuration
//!
//! Typed representation of the namespace hierarchy, shared-access edges,
//! feature flags and identity-provider mappings. A configuration is validated
//! once when it is loaded and is immutable afterwards.

pub mod validation;

use crate::errors::{Result, StrataError};
use crate::naming::NamingScheme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use validation::{ConfigValidator, NameLimits, ValidationIssue};

/// Feature flags controlling naming and enabled resource kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Features {
    /// Prefix of every generated group name
    pub group_prefix: String,
    /// Name of the synthetic "everything" level
    pub aggregated_level_name: String,
    /// Suffix appended to dataset names
    pub dataset_suffix: String,
    /// Suffix appended to RAW database names
    pub rawdb_suffix: String,
    /// Variant suffixes; one RAW database is generated per variant
    pub rawdb_variants: Vec<String>,
    /// Suffix appended to space names before sanitizing
    pub space_suffix: String,
    /// Account name of the root/admin group
    pub root_account: String,
    /// Generate RAW databases and the raw ACL
    pub with_raw_capability: bool,
    /// Generate spaces and the data-model ACLs
    pub with_datamodel_capability: bool,
    /// Extra metadata stamped on every created dataset
    pub dataset_metadata: BTreeMap<String, String>,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            group_prefix: "cdf:".to_string(),
            aggregated_level_name: "allprojects".to_string(),
            dataset_suffix: ":dataset".to_string(),
            rawdb_suffix: ":rawdb".to_string(),
            rawdb_variants: vec![String::new(), ":state".to_string()],
            space_suffix: ":space".to_string(),
            root_account: "root".to_string(),
            with_raw_capability: true,
            with_datamodel_capability: true,
            dataset_metadata: BTreeMap::new(),
        }
    }
}

/// Reference to another node (or aggregate pseudo-node) by name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedNode {
    /// Referenced node name
    pub node_name: String,
}

impl SharedNode {
    /// Reference a node by name
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }
}

/// One-hop grants from a node's OWNER group onto other nodes' resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SharedAccess {
    /// Nodes whose resources the owner group manages as owner
    pub owner: Vec<SharedNode>,
    /// Nodes whose resources the owner group may read
    pub read: Vec<SharedNode>,
}

impl SharedAccess {
    /// Every referenced node, owner side first
    pub fn references(&self) -> impl Iterator<Item = &SharedNode> {
        self.owner.iter().chain(self.read.iter())
    }
}

/// One organizational unit inside a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NamespaceNode {
    /// Globally unique node name, e.g. `src:001:sap`
    pub node_name: String,
    /// Free-text description copied onto created datasets
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides the external id of the node's dataset
    #[serde(default)]
    pub external_id: Option<String>,
    /// Metadata copied onto the node's dataset
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Shared-access grants of the node's owner group
    #[serde(default)]
    pub shared_access: SharedAccess,
}

impl NamespaceNode {
    /// Node without description, metadata or shared access
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            description: None,
            external_id: None,
            metadata: BTreeMap::new(),
            shared_access: SharedAccess::default(),
        }
    }
}

/// Named grouping of nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Namespace {
    /// Namespace name, e.g. `src`
    pub ns_name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered nodes of this namespace
    #[serde(default)]
    pub ns_nodes: Vec<NamespaceNode>,
}

/// Links a generated group to an identity-provider group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IdpMapping {
    /// Platform project the mapping applies to
    pub project: String,
    /// Generated group name
    pub group: String,
    /// Identity-provider group id
    pub source_id: String,
    /// Identity-provider group display name
    pub source_name: String,
}

/// Names of deployed resources to delete (or deprecate, for datasets)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DeleteOrDeprecate {
    /// Group names to delete
    pub groups: Vec<String>,
    /// Dataset names to deprecate
    pub datasets: Vec<String>,
    /// RAW database names to delete
    pub raw_dbs: Vec<String>,
    /// Space ids to delete
    pub spaces: Vec<String>,
}

impl DeleteOrDeprecate {
    /// True when nothing is listed
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.datasets.is_empty()
            && self.raw_dbs.is_empty()
            && self.spaces.is_empty()
    }
}

/// Complete bootstrap configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Platform project targeted by this configuration
    pub project: String,
    /// Naming and resource-kind flags
    #[serde(default)]
    pub features: Features,
    /// Identity-provider mappings
    #[serde(default)]
    pub idp_mappings: Vec<IdpMapping>,
    /// Namespace hierarchy
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
    /// Delete command input
    #[serde(default)]
    pub delete_or_deprecate: DeleteOrDeprecate,
}

impl BootstrapConfig {
    /// Configuration with default features and no namespaces
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            features: Features::default(),
            idp_mappings: Vec::new(),
            namespaces: Vec::new(),
            delete_or_deprecate: DeleteOrDeprecate::default(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BootstrapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrataError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            namespaces = config.namespaces.len(),
            "loaded bootstrap configuration"
        );
        Ok(config)
    }

    /// Run every validation rule, reporting all violations together
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::new(self).run().finish()
    }

    /// Naming scheme derived from the feature flags
    pub fn naming(&self) -> NamingScheme {
        NamingScheme::from_features(&self.features)
    }

    /// Every node with its namespace, in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = (&Namespace, &NamespaceNode)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.ns_nodes.iter().map(move |node| (ns, node)))
    }

    /// Look up a namespace by name
    pub fn namespace(&self, ns_name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.ns_name == ns_name)
    }

    /// Look up a node by name across all namespaces
    pub fn node(&self, node_name: &str) -> Option<&NamespaceNode> {
        self.nodes()
            .map(|(_, node)| node)
            .find(|node| node.node_name == node_name)
    }

    /// Identity-provider mapping for a group name in this project
    pub fn idp_mapping(&self, group_name: &str) -> Option<&IdpMapping> {
        self.idp_mappings
            .iter()
            .find(|m| m.project == self.project && m.group == group_name)
    }
}
