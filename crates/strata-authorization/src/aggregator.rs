//! Scope aggregator
//!
//! Computes, for a role at a node or namespace, the resource names the role's
//! group may see. OWNER groups additionally pick up the one-hop shared-access
//! grants of the node (or of every node in the namespace): `owner` targets
//! land in the OWNER bucket, `read` targets in the READ bucket. Grants are
//! never followed transitively.

use strata_core::{
    BootstrapConfig, NamingScheme, NamespaceNode, Result, RoleType, ScopeBuckets, ScopeContext,
    StrataError,
};

/// Scope aggregation over one configuration
pub struct ScopeAggregator<'a> {
    config: &'a BootstrapConfig,
    naming: &'a NamingScheme,
}

impl<'a> ScopeAggregator<'a> {
    /// Aggregator over `config` using `naming`
    pub fn new(config: &'a BootstrapConfig, naming: &'a NamingScheme) -> Self {
        Self { config, naming }
    }

    /// Scope context of `role` at a node (when given) or at a namespace
    pub fn get_scope_ctx(
        &self,
        role: RoleType,
        ns_name: &str,
        node_name: Option<&str>,
    ) -> Result<ScopeContext> {
        if role == RoleType::Admin {
            return Err(StrataError::internal(
                "ADMIN scope is not parameterised by namespace or node",
            ));
        }
        let ns = self
            .config
            .namespace(ns_name)
            .ok_or_else(|| StrataError::not_found(format!("namespace '{ns_name}'")))?;

        let mut ctx = ScopeContext::new();
        match node_name {
            Some(node_name) => {
                let node = ns
                    .ns_nodes
                    .iter()
                    .find(|node| node.node_name == node_name)
                    .ok_or_else(|| {
                        StrataError::not_found(format!(
                            "node '{node_name}' in namespace '{ns_name}'"
                        ))
                    })?;
                ctx.role_mut(role)
                    .merge(&self.naming.node_resources(&node.node_name));
                if role == RoleType::Owner {
                    self.add_shared_access(&mut ctx, node);
                }
            }
            None => {
                let direct = ctx.role_mut(role);
                for node in &ns.ns_nodes {
                    direct.merge(&self.naming.node_resources(&node.node_name));
                }
                direct.merge(&self.naming.node_resources(&self.naming.ns_aggregate(ns_name)));
                if role == RoleType::Owner {
                    for node in &ns.ns_nodes {
                        self.add_shared_access(&mut ctx, node);
                    }
                }
            }
        }
        Ok(ctx)
    }

    /// Scope context of `role` at the top level: every target resource
    pub fn top_scope_ctx(&self, role: RoleType) -> ScopeContext {
        let mut ctx = ScopeContext::new();
        ctx.role_mut(role).merge(&self.all_resources());
        ctx
    }

    /// Every resource name the configuration requires
    pub fn all_resources(&self) -> ScopeBuckets {
        let mut buckets = ScopeBuckets::default();
        for ns in &self.config.namespaces {
            for node in &ns.ns_nodes {
                buckets.merge(&self.naming.node_resources(&node.node_name));
            }
            buckets.merge(&self.naming.node_resources(&self.naming.ns_aggregate(&ns.ns_name)));
        }
        buckets.merge(&self.naming.node_resources(&self.naming.top_aggregate()));
        buckets
    }

    fn add_shared_access(&self, ctx: &mut ScopeContext, node: &NamespaceNode) {
        for target in &node.shared_access.owner {
            ctx.role_mut(RoleType::Owner)
                .merge(&self.naming.node_resources(&target.node_name));
        }
        for target in &node.shared_access.read {
            ctx.role_mut(RoleType::Read)
                .merge(&self.naming.node_resources(&target.node_name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Namespace, ScopeCtxType, SharedNode};

    fn config() -> BootstrapConfig {
        let mut sap = NamespaceNode::new("src:001:sap");
        sap.shared_access.read.push(SharedNode::new("src:002:weather"));
        let mut demand = NamespaceNode::new("uc:001:demand");
        demand.shared_access.owner.push(SharedNode::new("src:001:sap"));

        let mut config = BootstrapConfig::new("demo");
        config.namespaces = vec![
            Namespace {
                ns_name: "src".to_string(),
                description: None,
                ns_nodes: vec![sap, NamespaceNode::new("src:002:weather")],
            },
            Namespace {
                ns_name: "uc".to_string(),
                description: None,
                ns_nodes: vec![demand],
            },
        ];
        config
    }

    fn datasets(buckets: &ScopeBuckets) -> Vec<&str> {
        buckets
            .get(ScopeCtxType::Dataset)
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_node_owner_includes_shared_owner_targets() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let ctx = aggregator
            .get_scope_ctx(RoleType::Owner, "uc", Some("uc:001:demand"))
            .unwrap();
        assert_eq!(
            datasets(ctx.role(RoleType::Owner)),
            vec!["src:001:sap:dataset", "uc:001:demand:dataset"]
        );
        assert!(ctx.role(RoleType::Read).is_empty());
    }

    #[test]
    fn test_shared_access_is_one_hop() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let ctx = aggregator
            .get_scope_ctx(RoleType::Owner, "uc", Some("uc:001:demand"))
            .unwrap();
        // sap shares read onto weather; demand must not inherit that grant
        assert!(!ctx
            .role(RoleType::Read)
            .get(ScopeCtxType::Dataset)
            .contains("src:002:weather:dataset"));
    }

    #[test]
    fn test_node_read_has_no_shared_access() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let ctx = aggregator
            .get_scope_ctx(RoleType::Read, "uc", Some("uc:001:demand"))
            .unwrap();
        assert_eq!(
            datasets(ctx.role(RoleType::Read)),
            vec!["uc:001:demand:dataset"]
        );
        assert!(ctx.role(RoleType::Owner).is_empty());
    }

    #[test]
    fn test_namespace_level_unions_nodes_and_aggregate() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let ctx = aggregator
            .get_scope_ctx(RoleType::Owner, "src", None)
            .unwrap();
        assert_eq!(
            datasets(ctx.role(RoleType::Owner)),
            vec![
                "src:001:sap:dataset",
                "src:002:weather:dataset",
                "src:allprojects:dataset"
            ]
        );
        assert_eq!(
            datasets(ctx.role(RoleType::Read)),
            vec!["src:002:weather:dataset"]
        );
    }

    #[test]
    fn test_all_resources_cover_every_level() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let all = aggregator.all_resources();
        assert_eq!(all.get(ScopeCtxType::Dataset).len(), 6);
        assert_eq!(all.get(ScopeCtxType::RawDb).len(), 12);
        assert!(all.get(ScopeCtxType::Space).contains("allprojects-space"));
    }

    #[test]
    fn test_unknown_node_is_not_found() {
        let config = config();
        let naming = config.naming();
        let aggregator = ScopeAggregator::new(&config, &naming);
        let err = aggregator
            .get_scope_ctx(RoleType::Read, "src", Some("uc:001:demand"))
            .unwrap_err();
        assert!(matches!(err, StrataError::NotFound { .. }));
    }
}
