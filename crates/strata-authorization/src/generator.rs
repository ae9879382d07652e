//! Capability generator
//!
//! Maps the scope buckets of one role onto a capability for one ACL type.

use crate::acl::{role_actions, AclType, ScopeShape};
use crate::capability::{Capability, CapabilityScope};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use strata_core::{Result, RoleType, ScopeBuckets, ScopeCtxType, StrataError};

/// Translates dataset names into deployed dataset ids
pub trait DatasetIdResolver {
    /// Id of the deployed dataset with this name
    fn dataset_id(&self, name: &str) -> Option<i64>;
}

impl DatasetIdResolver for HashMap<String, i64> {
    fn dataset_id(&self, name: &str) -> Option<i64> {
        self.get(name).copied()
    }
}

impl DatasetIdResolver for BTreeMap<String, i64> {
    fn dataset_id(&self, name: &str) -> Option<i64> {
        self.get(name).copied()
    }
}

/// Builds capabilities, resolving dataset names through `R`
pub struct CapabilityGenerator<'a, R: DatasetIdResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: DatasetIdResolver + ?Sized> CapabilityGenerator<'a, R> {
    /// Generator backed by a dataset id resolver
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Capability for `acl` scoped to `buckets`, with the actions of `role`
    pub fn make_capability(
        &self,
        acl: AclType,
        buckets: &ScopeBuckets,
        role: RoleType,
    ) -> Result<Capability> {
        let actions = actions_for(acl, role)?;
        let scope = match acl.scope_shape() {
            ScopeShape::AllOnly => CapabilityScope::All,
            ScopeShape::Table => {
                CapabilityScope::Tables(buckets.get(ScopeCtxType::RawDb).clone())
            }
            ScopeShape::SpaceId => {
                CapabilityScope::SpaceIds(buckets.get(ScopeCtxType::Space).clone())
            }
            ScopeShape::Id => CapabilityScope::Ids(self.resolve_datasets(buckets)?),
            ScopeShape::CurrentUser => CapabilityScope::CurrentUser,
            ScopeShape::DatasetId => CapabilityScope::DatasetIds(self.resolve_datasets(buckets)?),
        };
        Ok(Capability::new(acl, actions, scope))
    }

    fn resolve_datasets(&self, buckets: &ScopeBuckets) -> Result<BTreeSet<i64>> {
        buckets
            .get(ScopeCtxType::Dataset)
            .iter()
            .map(|name| {
                self.resolver.dataset_id(name).ok_or_else(|| {
                    StrataError::resolution(format!(
                        "dataset '{name}' has no deployed id; datasets must be created before groups"
                    ))
                })
            })
            .collect()
    }
}

/// Capability for `acl` over every resource, with the actions of `role`
pub fn make_all_scope_capability(acl: AclType, role: RoleType) -> Result<Capability> {
    Ok(Capability::new(acl, actions_for(acl, role)?, CapabilityScope::All))
}

fn actions_for(acl: AclType, role: RoleType) -> Result<&'static [crate::acl::Action]> {
    role_actions(acl, role).ok_or_else(|| {
        StrataError::internal(format!("ACL '{acl}' has no actions for role '{role}'"))
    })
}
