//! Configuration validation rules
//!
//! The validator walks the whole document and accumulates every violation so a
//! single run reports all of them. Any violation aborts the run before a
//! remote call is made.

use super::BootstrapConfig;
use crate::errors::{Result, StrataError};
use crate::naming::{GroupLevel, NamingScheme};
use crate::scope::RoleType;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Remote length limits for generated names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameLimits {
    /// Group name
    pub group_name: usize,
    /// Dataset name
    pub dataset_name: usize,
    /// Dataset external id
    pub dataset_external_id: usize,
    /// RAW database name
    pub rawdb_name: usize,
    /// Space identifier
    pub space_id: usize,
}

impl NameLimits {
    /// Limits enforced by the platform
    pub const PLATFORM: NameLimits = NameLimits {
        group_name: 512,
        dataset_name: 50,
        dataset_external_id: 255,
        rawdb_name: 32,
        space_id: 43,
    };
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Required value is empty
    Required { field: String },
    /// Name appears more than once
    Duplicate { kind: &'static str, name: String },
    /// Shared-access reference to an unknown node
    DanglingReference { node: String, target: String },
    /// More than one IdP mapping for a (project, group) pair
    DuplicateIdpMapping { project: String, group: String },
    /// Generated name exceeds its limit
    TooLong {
        kind: &'static str,
        name: String,
        limit: usize,
    },
    /// Generated name has an invalid format
    InvalidFormat {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Required { field } => {
                write!(f, "field '{field}' is required but empty")
            }
            ValidationIssue::Duplicate { kind, name } => {
                write!(f, "{kind} '{name}' is defined more than once")
            }
            ValidationIssue::DanglingReference { node, target } => write!(
                f,
                "node '{node}' grants shared access to unknown node '{target}'"
            ),
            ValidationIssue::DuplicateIdpMapping { project, group } => write!(
                f,
                "group '{group}' has more than one IdP mapping in project '{project}'"
            ),
            ValidationIssue::TooLong { kind, name, limit } => write!(
                f,
                "{kind} '{name}' has {} characters, limit is {limit}",
                name.chars().count()
            ),
            ValidationIssue::InvalidFormat {
                kind,
                name,
                expected,
            } => write!(f, "{kind} '{name}' is invalid, expected {expected}"),
        }
    }
}

/// Generated names seen so far, per resource kind
#[derive(Default)]
struct GeneratedNames {
    datasets: HashSet<String>,
    external_ids: HashSet<String>,
    raw_dbs: HashSet<String>,
    spaces: HashSet<String>,
}

/// Accumulating validator over one configuration
pub struct ConfigValidator<'a> {
    config: &'a BootstrapConfig,
    naming: NamingScheme,
    limits: NameLimits,
    issues: Vec<ValidationIssue>,
}

impl<'a> ConfigValidator<'a> {
    /// Validator using the platform name limits
    pub fn new(config: &'a BootstrapConfig) -> Self {
        Self::with_limits(config, NameLimits::PLATFORM)
    }

    /// Validator using custom name limits
    pub fn with_limits(config: &'a BootstrapConfig, limits: NameLimits) -> Self {
        Self {
            config,
            naming: config.naming(),
            limits,
            issues: Vec::new(),
        }
    }

    /// Apply every rule
    pub fn run(mut self) -> Self {
        self.required_fields();
        self.unique_names();
        self.shared_access_references();
        self.idp_mappings();
        self.name_limits();
        self
    }

    /// Issues found so far
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Fold the issues into a single configuration error
    pub fn finish(self) -> Result<()> {
        if self.issues.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        Err(StrataError::config(details.join("; ")))
    }

    fn required(&mut self, field: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.issues.push(ValidationIssue::Required {
                field: field.into(),
            });
        }
    }

    fn required_fields(&mut self) {
        let config = self.config;
        self.required("project", &config.project);
        self.required(
            "features.aggregated-level-name",
            &config.features.aggregated_level_name,
        );
        self.required("features.root-account", &config.features.root_account);
        if config.features.with_raw_capability && config.features.rawdb_variants.is_empty() {
            self.issues.push(ValidationIssue::Required {
                field: "features.rawdb-variants".to_string(),
            });
        }
        for (idx, ns) in config.namespaces.iter().enumerate() {
            self.required(format!("namespaces[{idx}].ns-name"), &ns.ns_name);
            for (node_idx, node) in ns.ns_nodes.iter().enumerate() {
                self.required(
                    format!("namespaces[{idx}].ns-nodes[{node_idx}].node-name"),
                    &node.node_name,
                );
            }
        }
    }

    fn unique_names(&mut self) {
        let mut seen_ns = HashSet::new();
        // Aggregate pseudo-nodes own resources too, so nodes may not reuse their names
        let mut seen_nodes: HashSet<String> = self
            .config
            .namespaces
            .iter()
            .map(|ns| self.naming.ns_aggregate(&ns.ns_name))
            .collect();
        seen_nodes.insert(self.naming.top_aggregate());
        for ns in &self.config.namespaces {
            if !seen_ns.insert(ns.ns_name.as_str()) {
                self.issues.push(ValidationIssue::Duplicate {
                    kind: "namespace",
                    name: ns.ns_name.clone(),
                });
            }
            for node in &ns.ns_nodes {
                if !seen_nodes.insert(node.node_name.clone()) {
                    self.issues.push(ValidationIssue::Duplicate {
                        kind: "node",
                        name: node.node_name.clone(),
                    });
                }
            }
        }
    }

    fn shared_access_references(&mut self) {
        let mut known: HashSet<String> = self
            .config
            .nodes()
            .map(|(_, node)| node.node_name.clone())
            .collect();
        for ns in &self.config.namespaces {
            known.insert(self.naming.ns_aggregate(&ns.ns_name));
        }
        known.insert(self.naming.top_aggregate());

        for (_, node) in self.config.nodes() {
            for target in node.shared_access.references() {
                if !known.contains(&target.node_name) {
                    self.issues.push(ValidationIssue::DanglingReference {
                        node: node.node_name.clone(),
                        target: target.node_name.clone(),
                    });
                }
            }
        }
    }

    fn idp_mappings(&mut self) {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        for mapping in &self.config.idp_mappings {
            *counts
                .entry((mapping.project.as_str(), mapping.group.as_str()))
                .or_default() += 1;
        }
        let mut duplicates: Vec<_> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((project, group), _)| ValidationIssue::DuplicateIdpMapping {
                project: project.to_string(),
                group: group.to_string(),
            })
            .collect();
        duplicates.sort_by_key(ToString::to_string);
        self.issues.extend(duplicates);
    }

    fn name_limits(&mut self) {
        let naming = self.naming.clone();
        let limits = self.limits;

        // Resource-bearing identifiers: every node, every namespace aggregate, the top aggregate.
        let mut identifiers: Vec<(String, Option<String>)> = Vec::new();
        let mut levels = vec![GroupLevel::Root];
        for ns in &self.config.namespaces {
            for node in &ns.ns_nodes {
                identifiers.push((node.node_name.clone(), node.external_id.clone()));
                for role in RoleType::PARAMETERIZED {
                    levels.push(GroupLevel::Node {
                        role,
                        ns_name: ns.ns_name.clone(),
                        node_name: node.node_name.clone(),
                    });
                }
            }
            identifiers.push((naming.ns_aggregate(&ns.ns_name), None));
            for role in RoleType::PARAMETERIZED {
                levels.push(GroupLevel::Namespace {
                    role,
                    ns_name: ns.ns_name.clone(),
                });
            }
        }
        identifiers.push((naming.top_aggregate(), None));
        for role in RoleType::PARAMETERIZED {
            levels.push(GroupLevel::Top { role });
        }

        // Repeated identifiers are already reported as duplicate nodes
        let mut visited = HashSet::new();
        let mut generated = GeneratedNames::default();
        for (identifier, external_id) in identifiers {
            if !visited.insert(identifier.clone()) {
                continue;
            }
            let dataset = naming.dataset_name(&identifier);
            self.max_len("dataset name", &dataset, limits.dataset_name);
            self.unique_generated(&mut generated.datasets, "dataset name", &dataset);
            let external_id = external_id.unwrap_or(dataset);
            self.max_len(
                "dataset external id",
                &external_id,
                limits.dataset_external_id,
            );
            self.unique_generated(
                &mut generated.external_ids,
                "dataset external id",
                &external_id,
            );
            if naming.with_rawdbs() {
                for rawdb in naming.rawdb_names(&identifier) {
                    self.max_len("RAW database", &rawdb, limits.rawdb_name);
                    self.unique_generated(&mut generated.raw_dbs, "RAW database", &rawdb);
                }
            }
            if naming.with_spaces() {
                let space = naming.space_id(&identifier);
                self.max_len("space", &space, limits.space_id);
                self.unique_generated(&mut generated.spaces, "space", &space);
                if !space.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    self.issues.push(ValidationIssue::InvalidFormat {
                        kind: "space",
                        name: space,
                        expected: "an identifier starting with a letter",
                    });
                }
            }
        }

        for level in levels {
            let name = naming.group_name(&level);
            self.max_len("group name", &name, limits.group_name);
        }
    }

    fn unique_generated(&mut self, seen: &mut HashSet<String>, kind: &'static str, name: &str) {
        if !seen.insert(name.to_string()) {
            self.issues.push(ValidationIssue::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }

    fn max_len(&mut self, kind: &'static str, name: &str, limit: usize) {
        if name.chars().count() > limit {
            self.issues.push(ValidationIssue::TooLong {
                kind,
                name: name.to_string(),
                limit,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdpMapping, Namespace, NamespaceNode, SharedNode};

    fn config_with(nodes: &[(&str, &[&str])]) -> BootstrapConfig {
        let mut config = BootstrapConfig::new("demo");
        for (ns_name, node_names) in nodes {
            config.namespaces.push(Namespace {
                ns_name: (*ns_name).to_string(),
                description: None,
                ns_nodes: node_names.iter().map(|n| NamespaceNode::new(*n)).collect(),
            });
        }
        config
    }

    #[test]
    fn test_valid_config_passes() {
        let config = config_with(&[("src", &["src:001:sap"]), ("uc", &["uc:001:demand"])]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_node_across_namespaces() {
        let config = config_with(&[("src", &["shared:001"]), ("uc", &["shared:001"])]);
        let issues = ConfigValidator::new(&config).run();
        assert_eq!(
            issues.issues(),
            &[ValidationIssue::Duplicate {
                kind: "node",
                name: "shared:001".to_string()
            }]
        );
    }

    #[test]
    fn test_node_named_like_aggregate() {
        for node in ["src:allprojects", "allprojects"] {
            let config = config_with(&[("src", &[node])]);
            let validator = ConfigValidator::new(&config).run();
            assert_eq!(
                validator.issues(),
                &[ValidationIssue::Duplicate {
                    kind: "node",
                    name: node.to_string()
                }]
            );
        }
    }

    #[test]
    fn test_node_named_like_other_namespace_aggregate() {
        let config = config_with(&[("src", &["src:001"]), ("uc", &["src:allprojects"])]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_space_collision() {
        let config = config_with(&[("src", &["src:001", "src-001"])]);
        let validator = ConfigValidator::new(&config).run();
        assert_eq!(
            validator.issues(),
            &[ValidationIssue::Duplicate {
                kind: "space",
                name: "src-001-space".to_string()
            }]
        );
    }

    #[test]
    fn test_external_id_collision() {
        let mut config = config_with(&[("src", &["src:001", "src:002"])]);
        config.namespaces[0].ns_nodes[1].external_id = Some("src:001:dataset".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dataset external id 'src:001:dataset'"));
    }

    #[test]
    fn test_dangling_shared_access() {
        let mut config = config_with(&[("src", &["src:001:sap"])]);
        config.namespaces[0].ns_nodes[0]
            .shared_access
            .read
            .push(SharedNode::new("src:999:gone"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("src:999:gone"));
        assert!(err.to_string().contains("src:001:sap"));
    }

    #[test]
    fn test_aggregate_references_resolve() {
        let mut config = config_with(&[("src", &["src:001:sap"])]);
        let shared = &mut config.namespaces[0].ns_nodes[0].shared_access;
        shared.owner.push(SharedNode::new("src:allprojects"));
        shared.read.push(SharedNode::new("allprojects"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_idp_mapping() {
        let mut config = config_with(&[("src", &["src:001:sap"])]);
        for source in ["a", "b"] {
            config.idp_mappings.push(IdpMapping {
                project: "demo".to_string(),
                group: "cdf:root".to_string(),
                source_id: source.to_string(),
                source_name: source.to_string(),
            });
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than one IdP mapping"));
    }

    #[test]
    fn test_rawdb_name_limit() {
        let config = config_with(&[("src", &["src:001:a-very-long-source-system"])]);
        let validator = ConfigValidator::new(&config).run();
        assert!(validator.issues().iter().any(|issue| matches!(
            issue,
            ValidationIssue::TooLong {
                kind: "RAW database",
                limit: 32,
                ..
            }
        )));
    }

    #[test]
    fn test_space_must_start_with_letter() {
        let config = config_with(&[("1src", &["1src:001"])]);
        let validator = ConfigValidator::new(&config).run();
        assert!(validator
            .issues()
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::InvalidFormat { kind: "space", .. })));
    }

    #[test]
    fn test_all_issues_reported_together() {
        let mut config = config_with(&[("src", &["src:001", "src:001"])]);
        config.project = String::new();
        let validator = ConfigValidator::new(&config).run();
        assert_eq!(validator.issues().len(), 2);
    }
}
