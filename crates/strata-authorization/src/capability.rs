//! Capability model and its remote wire shape
//!
//! A capability serialises as a single-key object:
//! `{"datasetsAcl": {"actions": ["READ"], "scope": {"idScope": {"ids": [1]}}}}`.
//! Actions and scope members are kept in ordered sets so two capabilities
//! granting the same thing always compare equal.

use crate::acl::{Action, AclType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Resources a capability applies to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityScope {
    /// Every resource
    All,
    /// Only the calling principal's own groups
    CurrentUser,
    /// Datasets addressed by id
    Ids(BTreeSet<i64>),
    /// Resources inside the datasets with these ids
    DatasetIds(BTreeSet<i64>),
    /// Every table of these RAW databases
    Tables(BTreeSet<String>),
    /// Data-model spaces
    SpaceIds(BTreeSet<String>),
}

impl CapabilityScope {
    /// True when the scope lists no resources
    pub fn is_empty(&self) -> bool {
        match self {
            CapabilityScope::All | CapabilityScope::CurrentUser => false,
            CapabilityScope::Ids(ids) | CapabilityScope::DatasetIds(ids) => ids.is_empty(),
            CapabilityScope::Tables(names) | CapabilityScope::SpaceIds(names) => names.is_empty(),
        }
    }
}

/// One ACL type bound to an action list and a scope
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireCapability", into = "WireCapability")]
pub struct Capability {
    /// ACL type
    pub acl: AclType,
    /// Granted actions
    pub actions: BTreeSet<Action>,
    /// Scope the actions apply to
    pub scope: CapabilityScope,
}

impl Capability {
    /// Build a capability from an action slice
    pub fn new(acl: AclType, actions: &[Action], scope: CapabilityScope) -> Self {
        Self {
            acl,
            actions: actions.iter().copied().collect(),
            scope,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum WireScope {
    All {},
    #[serde(rename = "currentuserscope")]
    CurrentUser {},
    IdScope {
        ids: Vec<i64>,
    },
    DatasetScope {
        ids: Vec<i64>,
    },
    TableScope {
        #[serde(rename = "dbsToTables")]
        dbs_to_tables: BTreeMap<String, Vec<String>>,
    },
    SpaceIdScope {
        #[serde(rename = "spaceIds")]
        space_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireAcl {
    actions: Vec<Action>,
    scope: WireScope,
}

type WireCapability = BTreeMap<String, WireAcl>;

impl From<Capability> for WireCapability {
    fn from(capability: Capability) -> Self {
        let scope = match capability.scope {
            CapabilityScope::All => WireScope::All {},
            CapabilityScope::CurrentUser => WireScope::CurrentUser {},
            CapabilityScope::Ids(ids) => WireScope::IdScope {
                ids: ids.into_iter().collect(),
            },
            CapabilityScope::DatasetIds(ids) => WireScope::DatasetScope {
                ids: ids.into_iter().collect(),
            },
            // An empty table list means every table of the database.
            CapabilityScope::Tables(dbs) => WireScope::TableScope {
                dbs_to_tables: dbs.into_iter().map(|db| (db, Vec::new())).collect(),
            },
            CapabilityScope::SpaceIds(spaces) => WireScope::SpaceIdScope {
                space_ids: spaces.into_iter().collect(),
            },
        };
        let mut wire = BTreeMap::new();
        wire.insert(
            capability.acl.wire_name(),
            WireAcl {
                actions: capability.actions.into_iter().collect(),
                scope,
            },
        );
        wire
    }
}

impl TryFrom<WireCapability> for Capability {
    type Error = String;

    fn try_from(wire: WireCapability) -> Result<Self, Self::Error> {
        if wire.len() != 1 {
            return Err(format!(
                "capability must have exactly one ACL key, found {}",
                wire.len()
            ));
        }
        let (name, body) = wire
            .into_iter()
            .next()
            .ok_or_else(|| "capability has no ACL key".to_string())?;
        let acl: AclType = name.parse().map_err(|e: crate::acl::UnknownAclType| e.to_string())?;
        let scope = match body.scope {
            WireScope::All {} => CapabilityScope::All,
            WireScope::CurrentUser {} => CapabilityScope::CurrentUser,
            WireScope::IdScope { ids } => CapabilityScope::Ids(ids.into_iter().collect()),
            WireScope::DatasetScope { ids } => {
                CapabilityScope::DatasetIds(ids.into_iter().collect())
            }
            WireScope::TableScope { dbs_to_tables } => {
                CapabilityScope::Tables(dbs_to_tables.into_keys().collect())
            }
            WireScope::SpaceIdScope { space_ids } => {
                CapabilityScope::SpaceIds(space_ids.into_iter().collect())
            }
        };
        Ok(Capability {
            acl,
            actions: body.actions.into_iter().collect(),
            scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_of_dataset_scope() {
        let capability = Capability::new(
            AclType::TimeSeries,
            &[Action::Write, Action::Read],
            CapabilityScope::DatasetIds([3, 1].into_iter().collect()),
        );
        assert_eq!(
            serde_json::to_value(&capability).unwrap(),
            json!({"timeSeriesAcl": {"actions": ["READ", "WRITE"], "scope": {"datasetScope": {"ids": [1, 3]}}}})
        );
    }

    #[test]
    fn test_wire_shape_of_marker_scopes() {
        let all = Capability::new(AclType::Projects, &[Action::List], CapabilityScope::All);
        assert_eq!(
            serde_json::to_value(&all).unwrap(),
            json!({"projectsAcl": {"actions": ["LIST"], "scope": {"all": {}}}})
        );
        let own = Capability::new(AclType::Groups, &[Action::List], CapabilityScope::CurrentUser);
        assert_eq!(
            serde_json::to_value(&own).unwrap(),
            json!({"groupsAcl": {"actions": ["LIST"], "scope": {"currentuserscope": {}}}})
        );
    }

    #[test]
    fn test_wire_shape_of_table_and_space_scopes() {
        let raw = Capability::new(
            AclType::Raw,
            &[Action::Read],
            CapabilityScope::Tables(["a:rawdb".to_string()].into_iter().collect()),
        );
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            json!({"rawAcl": {"actions": ["READ"], "scope": {"tableScope": {"dbsToTables": {"a:rawdb": []}}}}})
        );
        let parsed: Capability = serde_json::from_value(json!(
            {"dataModelsAcl": {"actions": ["READ"], "scope": {"spaceIdScope": {"spaceIds": ["a-space"]}}}}
        ))
        .unwrap();
        assert_eq!(
            parsed.scope,
            CapabilityScope::SpaceIds(["a-space".to_string()].into_iter().collect())
        );
    }

    #[test]
    fn test_unknown_acl_rejected() {
        let parsed = serde_json::from_value::<Capability>(json!(
            {"weirdAcl": {"actions": ["READ"], "scope": {"all": {}}}}
        ));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_action_order_is_not_significant() {
        let a = Capability::new(AclType::Raw, &[Action::List, Action::Read], CapabilityScope::All);
        let b = Capability::new(AclType::Raw, &[Action::Read, Action::List], CapabilityScope::All);
        assert_eq!(a, b);
    }
}
