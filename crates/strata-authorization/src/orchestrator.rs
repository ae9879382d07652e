//! Group name and capability orchestrator
//!
//! Walks the node, namespace, top and root levels and produces one named group
//! definition per position. Enumeration order is: for each of READ then OWNER,
//! every node of every namespace followed by the namespace itself, then the
//! top level; the root group comes last.

use crate::acl::AclType;
use crate::aggregator::ScopeAggregator;
use crate::capability::Capability;
use crate::generator::{make_all_scope_capability, CapabilityGenerator, DatasetIdResolver};
use serde::{Deserialize, Serialize};
use strata_core::{
    BootstrapConfig, GroupLevel, NamingScheme, Result, RoleType, ScopeContext,
};
use tracing::debug;

/// Identity-provider group linked to a platform group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdpSource {
    /// Identity-provider group id
    pub source_id: String,
    /// Identity-provider group display name
    pub source_name: String,
}

/// Target definition of one platform group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Group name
    pub name: String,
    /// Hierarchy position the group was generated for
    pub level: GroupLevel,
    /// Capabilities in generation order
    pub capabilities: Vec<Capability>,
    /// Identity-provider linkage, when mapped
    pub source: Option<IdpSource>,
}

/// Generates group definitions for one configuration
pub struct GroupOrchestrator<'a, R: DatasetIdResolver + ?Sized> {
    config: &'a BootstrapConfig,
    naming: &'a NamingScheme,
    aggregator: ScopeAggregator<'a>,
    generator: CapabilityGenerator<'a, R>,
    acl_types: Vec<AclType>,
}

impl<'a, R: DatasetIdResolver + ?Sized> GroupOrchestrator<'a, R> {
    /// Orchestrator resolving dataset ids through `resolver`
    pub fn new(config: &'a BootstrapConfig, naming: &'a NamingScheme, resolver: &'a R) -> Self {
        let acl_types = default_acl_types(config);
        Self {
            config,
            naming,
            aggregator: ScopeAggregator::new(config, naming),
            generator: CapabilityGenerator::new(resolver),
            acl_types,
        }
    }

    /// ACL types every non-root group is generated from
    pub fn acl_types(&self) -> &[AclType] {
        &self.acl_types
    }

    /// Every group definition, in enumeration order
    pub fn generate_all(&self) -> Result<Vec<GroupDefinition>> {
        let mut groups = Vec::new();
        for role in RoleType::PARAMETERIZED {
            for ns in &self.config.namespaces {
                for node in &ns.ns_nodes {
                    groups.push(self.group_for(&GroupLevel::Node {
                        role,
                        ns_name: ns.ns_name.clone(),
                        node_name: node.node_name.clone(),
                    })?);
                }
                groups.push(self.group_for(&GroupLevel::Namespace {
                    role,
                    ns_name: ns.ns_name.clone(),
                })?);
            }
            groups.push(self.group_for(&GroupLevel::Top { role })?);
        }
        groups.push(self.group_for(&GroupLevel::Root)?);
        Ok(groups)
    }

    /// Definition of the group at one hierarchy position
    pub fn group_for(&self, level: &GroupLevel) -> Result<GroupDefinition> {
        let name = self.naming.group_name(level);
        let capabilities = match level {
            GroupLevel::Node {
                role,
                ns_name,
                node_name,
            } => {
                let ctx = self
                    .aggregator
                    .get_scope_ctx(*role, ns_name, Some(node_name))?;
                self.scoped_capabilities(&name, *role, &ctx)
            }
            GroupLevel::Namespace { role, ns_name } => {
                let ctx = self.aggregator.get_scope_ctx(*role, ns_name, None)?;
                self.scoped_capabilities(&name, *role, &ctx)
            }
            GroupLevel::Top { role } => {
                let ctx = self.aggregator.top_scope_ctx(*role);
                self.acl_types
                    .iter()
                    .map(|acl| self.generator.make_capability(*acl, ctx.role(*role), *role))
                    .collect()
            }
            GroupLevel::Root => self.root_capabilities(),
        }
        .map_err(|e| e.context(format!("group '{name}'")))?;

        let source = self.config.idp_mapping(&name).map(|mapping| IdpSource {
            source_id: mapping.source_id.clone(),
            source_name: mapping.source_name.clone(),
        });
        Ok(GroupDefinition {
            name,
            level: level.clone(),
            capabilities,
            source,
        })
    }

    /// Capabilities of a node or namespace group
    ///
    /// Context-free ACLs are emitted once with the group's own role. Every
    /// other ACL is emitted per sub-role bucket, unless that bucket has neither
    /// RAW databases nor datasets.
    fn scoped_capabilities(
        &self,
        name: &str,
        role: RoleType,
        ctx: &ScopeContext,
    ) -> Result<Vec<Capability>> {
        let mut capabilities = Vec::new();
        for acl in &self.acl_types {
            if acl.scope_shape().is_context_free() {
                capabilities.push(self.generator.make_capability(*acl, ctx.role(role), role)?);
                continue;
            }
            for (sub_role, buckets) in ctx.iter() {
                if buckets.is_resource_empty() {
                    debug!(group = name, acl = %acl, sub_role = %sub_role, "suppressed empty scope");
                    continue;
                }
                capabilities.push(self.generator.make_capability(*acl, buckets, sub_role)?);
            }
        }
        Ok(capabilities)
    }

    /// Root capabilities: all-scope everywhere, admin actions where designated
    fn root_capabilities(&self) -> Result<Vec<Capability>> {
        let mut capabilities = Vec::new();
        for acl in &self.acl_types {
            if !acl.is_admin_designated() {
                capabilities.push(make_all_scope_capability(*acl, RoleType::Owner)?);
            }
        }
        for acl in AclType::ALL {
            if acl.is_admin_designated() {
                capabilities.push(make_all_scope_capability(acl, RoleType::Admin)?);
            }
        }
        Ok(capabilities)
    }
}

/// ACL types enabled by the configuration's feature flags
pub fn default_acl_types(config: &BootstrapConfig) -> Vec<AclType> {
    AclType::ALL
        .into_iter()
        .filter(|acl| match acl {
            AclType::Raw => config.features.with_raw_capability,
            acl if acl.is_data_model() => config.features.with_datamodel_capability,
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityScope;
    use std::collections::{HashMap, HashSet};
    use strata_core::{Namespace, NamespaceNode};

    fn config() -> BootstrapConfig {
        let mut config = BootstrapConfig::new("demo");
        config.namespaces.push(Namespace {
            ns_name: "src".to_string(),
            description: None,
            ns_nodes: vec![NamespaceNode::new("src:001:sap")],
        });
        config
    }

    fn resolver() -> HashMap<String, i64> {
        ["src:001:sap:dataset", "src:allprojects:dataset", "allprojects:dataset"]
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx as i64 + 1))
            .collect()
    }

    #[test]
    fn test_group_names_in_enumeration_order() {
        let config = config();
        let naming = config.naming();
        let resolver = resolver();
        let orchestrator = GroupOrchestrator::new(&config, &naming, &resolver);
        let names: Vec<String> = orchestrator
            .generate_all()
            .unwrap()
            .into_iter()
            .map(|group| group.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "cdf:src:001:sap:read",
                "cdf:src:allprojects:read",
                "cdf:allprojects:read",
                "cdf:src:001:sap:owner",
                "cdf:src:allprojects:owner",
                "cdf:allprojects:owner",
                "cdf:root",
            ]
        );
    }

    #[test]
    fn test_read_group_has_no_owner_pass() {
        let config = config();
        let naming = config.naming();
        let resolver = resolver();
        let orchestrator = GroupOrchestrator::new(&config, &naming, &resolver);
        let group = orchestrator
            .group_for(&GroupLevel::Node {
                role: RoleType::Read,
                ns_name: "src".to_string(),
                node_name: "src:001:sap".to_string(),
            })
            .unwrap();
        let acls: Vec<AclType> = group.capabilities.iter().map(|c| c.acl).collect();
        let unique: HashSet<AclType> = acls.iter().copied().collect();
        assert_eq!(acls.len(), unique.len());
        assert_eq!(acls.len(), orchestrator.acl_types().len());
    }

    #[test]
    fn test_root_is_disjoint_and_all_scoped() {
        let config = config();
        let naming = config.naming();
        let resolver = resolver();
        let orchestrator = GroupOrchestrator::new(&config, &naming, &resolver);
        let root = orchestrator.group_for(&GroupLevel::Root).unwrap();
        let unique: HashSet<AclType> = root.capabilities.iter().map(|c| c.acl).collect();
        assert_eq!(unique.len(), root.capabilities.len());
        assert!(root
            .capabilities
            .iter()
            .all(|c| c.scope == CapabilityScope::All));
    }

    #[test]
    fn test_feature_flags_filter_acls() {
        let mut config = config();
        config.features.with_raw_capability = false;
        config.features.with_datamodel_capability = false;
        let types = default_acl_types(&config);
        assert!(!types.contains(&AclType::Raw));
        assert!(!types.contains(&AclType::DataModels));
        assert!(types.contains(&AclType::Datasets));
    }

    #[test]
    fn test_resolution_error_names_group() {
        let config = config();
        let naming = config.naming();
        let resolver: HashMap<String, i64> = HashMap::new();
        let orchestrator = GroupOrchestrator::new(&config, &naming, &resolver);
        let err = orchestrator.generate_all().unwrap_err();
        assert!(err.to_string().contains("group 'cdf:src:001:sap:read'"));
    }
}
