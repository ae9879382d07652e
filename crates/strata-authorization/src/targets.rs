//! Target resources and the exportable plan
//!
//! The target set is every dataset, RAW database and space the configuration
//! requires: one per node, one per namespace aggregate and one for the top
//! aggregate. Collections are name-sorted so output does not depend on the
//! declaration order of namespaces or nodes.

use crate::generator::DatasetIdResolver;
use crate::orchestrator::{GroupDefinition, GroupOrchestrator};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strata_core::{BootstrapConfig, NamespaceNode, NamingScheme, Result};

/// Metadata key recording which tool created a dataset
pub const CREATED_BY_KEY: &str = "created_by";
/// Value stored under [`CREATED_BY_KEY`]
pub const CREATED_BY_VALUE: &str = "strata";

/// A dataset the configuration requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetTarget {
    /// Template-generated dataset name
    pub name: String,
    /// External id; the node's override when set, otherwise the name
    pub external_id: String,
    /// Human-readable description
    pub description: String,
    /// Metadata stamped on the dataset
    pub metadata: BTreeMap<String, String>,
}

/// A data-model space the configuration requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceTarget {
    /// Sanitized space identifier
    pub space: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
}

/// Every resource the configuration requires, group-independent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTargets {
    /// Datasets, sorted by name
    pub datasets: Vec<DatasetTarget>,
    /// RAW database names
    pub raw_dbs: BTreeSet<String>,
    /// Spaces, sorted by identifier
    pub spaces: Vec<SpaceTarget>,
}

impl ResourceTargets {
    /// Derive the resource targets of a configuration
    pub fn from_config(config: &BootstrapConfig, naming: &NamingScheme) -> Self {
        let mut targets = ResourceTargets::default();
        for ns in &config.namespaces {
            for node in &ns.ns_nodes {
                let description = node
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Node {}", node.node_name));
                targets.add(config, naming, &node.node_name, description, Some(node));
            }
            let aggregate = naming.ns_aggregate(&ns.ns_name);
            let description = ns
                .description
                .clone()
                .unwrap_or_else(|| format!("Namespace {} aggregate", ns.ns_name));
            targets.add(config, naming, &aggregate, description, None);
        }
        targets.add(
            config,
            naming,
            &naming.top_aggregate(),
            format!("Project {} aggregate", config.project),
            None,
        );
        targets.datasets.sort_by(|a, b| a.name.cmp(&b.name));
        targets.spaces.sort_by(|a, b| a.space.cmp(&b.space));
        targets
    }

    /// Dataset names, sorted
    pub fn dataset_names(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.name.as_str()).collect()
    }

    fn add(
        &mut self,
        config: &BootstrapConfig,
        naming: &NamingScheme,
        node_name: &str,
        description: String,
        node: Option<&NamespaceNode>,
    ) {
        let name = naming.dataset_name(node_name);
        let mut metadata = config.features.dataset_metadata.clone();
        if let Some(node) = node {
            metadata.extend(node.metadata.clone());
        }
        metadata.insert(CREATED_BY_KEY.to_string(), CREATED_BY_VALUE.to_string());
        self.datasets.push(DatasetTarget {
            external_id: node
                .and_then(|n| n.external_id.clone())
                .unwrap_or_else(|| name.clone()),
            name,
            description: description.clone(),
            metadata,
        });
        if naming.with_rawdbs() {
            self.raw_dbs.extend(naming.rawdb_names(node_name));
        }
        if naming.with_spaces() {
            self.spaces.push(SpaceTarget {
                space: naming.space_id(node_name),
                name: naming.space_name(node_name),
                description,
            });
        }
    }
}

/// Read-only export of everything a deploy would converge to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlan {
    /// Target project
    pub project: String,
    /// Resource targets
    #[serde(flatten)]
    pub resources: ResourceTargets,
    /// Group definitions in enumeration order
    pub groups: Vec<GroupDefinition>,
}

impl TargetPlan {
    /// Build the plan, resolving dataset ids through `resolver`
    pub fn build<R: DatasetIdResolver + ?Sized>(
        config: &BootstrapConfig,
        resolver: &R,
    ) -> Result<Self> {
        let naming = config.naming();
        let resources = ResourceTargets::from_config(config, &naming);
        let groups = GroupOrchestrator::new(config, &naming, resolver).generate_all()?;
        Ok(Self {
            project: config.project.clone(),
            resources,
            groups,
        })
    }

    /// Pretty-printed JSON rendering
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
