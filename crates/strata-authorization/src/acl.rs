//! ACL catalogue and action tables
//!
//! The set of ACL types is closed. Scope shape and action defaults are
//! resolved through exhaustive matches, so adding a variant without deciding
//! its shape fails to compile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strata_core::RoleType;

/// Action verb granted by a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Read resources
    Read,
    /// Create and modify resources
    Write,
    /// Manage the resource container itself
    Owner,
    /// List resources
    List,
    /// Create resources
    Create,
    /// Update resources
    Update,
    /// Delete resources
    Delete,
}

/// Shape of the scope object an ACL type accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeShape {
    /// Only `{all: {}}` is accepted
    AllOnly,
    /// RAW database to table mapping
    Table,
    /// Data-model space ids
    SpaceId,
    /// Dataset ids addressing the datasets themselves
    Id,
    /// The calling principal's own groups
    CurrentUser,
    /// Dataset ids scoping the ACL's resources
    DatasetId,
}

impl ScopeShape {
    /// True when the scope does not depend on the scope context
    pub fn is_context_free(self) -> bool {
        matches!(self, ScopeShape::AllOnly | ScopeShape::CurrentUser)
    }
}

/// Error parsing an ACL type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ACL type '{0}'")]
pub struct UnknownAclType(pub String);

/// Remote permission category
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AclType {
    Annotations,
    Assets,
    DataModelInstances,
    DataModels,
    Datasets,
    DiagramParsing,
    DigitalTwin,
    EntityMatching,
    Events,
    ExtractionConfigs,
    ExtractionPipelines,
    ExtractionRuns,
    Files,
    Functions,
    Geospatial,
    Groups,
    Labels,
    Projects,
    Raw,
    Relationships,
    Sequences,
    Sessions,
    TemplateGroups,
    TemplateInstances,
    ThreeD,
    TimeSeries,
    Transformations,
    Types,
}

impl AclType {
    /// Every ACL type, in wire-name order
    pub const ALL: [AclType; 28] = [
        AclType::Annotations,
        AclType::Assets,
        AclType::DataModelInstances,
        AclType::DataModels,
        AclType::Datasets,
        AclType::DiagramParsing,
        AclType::DigitalTwin,
        AclType::EntityMatching,
        AclType::Events,
        AclType::ExtractionConfigs,
        AclType::ExtractionPipelines,
        AclType::ExtractionRuns,
        AclType::Files,
        AclType::Functions,
        AclType::Geospatial,
        AclType::Groups,
        AclType::Labels,
        AclType::Projects,
        AclType::Raw,
        AclType::Relationships,
        AclType::Sequences,
        AclType::Sessions,
        AclType::TemplateGroups,
        AclType::TemplateInstances,
        AclType::ThreeD,
        AclType::TimeSeries,
        AclType::Transformations,
        AclType::Types,
    ];

    /// Short name, e.g. `datasets`
    pub fn as_str(self) -> &'static str {
        match self {
            AclType::Annotations => "annotations",
            AclType::Assets => "assets",
            AclType::DataModelInstances => "dataModelInstances",
            AclType::DataModels => "dataModels",
            AclType::Datasets => "datasets",
            AclType::DiagramParsing => "diagramParsing",
            AclType::DigitalTwin => "digitalTwin",
            AclType::EntityMatching => "entitymatching",
            AclType::Events => "events",
            AclType::ExtractionConfigs => "extractionConfigs",
            AclType::ExtractionPipelines => "extractionPipelines",
            AclType::ExtractionRuns => "extractionRuns",
            AclType::Files => "files",
            AclType::Functions => "functions",
            AclType::Geospatial => "geospatial",
            AclType::Groups => "groups",
            AclType::Labels => "labels",
            AclType::Projects => "projects",
            AclType::Raw => "raw",
            AclType::Relationships => "relationships",
            AclType::Sequences => "sequences",
            AclType::Sessions => "sessions",
            AclType::TemplateGroups => "templateGroups",
            AclType::TemplateInstances => "templateInstances",
            AclType::ThreeD => "threed",
            AclType::TimeSeries => "timeSeries",
            AclType::Transformations => "transformations",
            AclType::Types => "types",
        }
    }

    /// Wire key, e.g. `datasetsAcl`
    pub fn wire_name(self) -> String {
        format!("{}Acl", self.as_str())
    }

    /// Scope shape accepted by the remote API for this ACL
    pub fn scope_shape(self) -> ScopeShape {
        match self {
            AclType::Annotations
            | AclType::DiagramParsing
            | AclType::DigitalTwin
            | AclType::EntityMatching
            | AclType::Functions
            | AclType::Geospatial
            | AclType::Projects
            | AclType::Sessions
            | AclType::TemplateGroups
            | AclType::TemplateInstances
            | AclType::ThreeD
            | AclType::Types => ScopeShape::AllOnly,
            AclType::Raw => ScopeShape::Table,
            AclType::DataModels | AclType::DataModelInstances => ScopeShape::SpaceId,
            AclType::Datasets => ScopeShape::Id,
            AclType::Groups => ScopeShape::CurrentUser,
            AclType::Assets
            | AclType::Events
            | AclType::ExtractionConfigs
            | AclType::ExtractionPipelines
            | AclType::ExtractionRuns
            | AclType::Files
            | AclType::Labels
            | AclType::Relationships
            | AclType::Sequences
            | AclType::TimeSeries
            | AclType::Transformations => ScopeShape::DatasetId,
        }
    }

    /// Whether this ACL only accepts the all-scope
    pub fn is_all_scope_only(self) -> bool {
        self.scope_shape() == ScopeShape::AllOnly
    }

    /// Whether this ACL belongs to the data-model family
    pub fn is_data_model(self) -> bool {
        self.scope_shape() == ScopeShape::SpaceId
    }

    /// Whether the root group receives admin actions for this ACL
    pub fn is_admin_designated(self) -> bool {
        admin_actions(self).is_some()
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclType {
    type Err = UnknownAclType;

    /// Accepts the short name (`datasets`) or the wire key (`datasetsAcl`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.strip_suffix("Acl").unwrap_or(s);
        AclType::ALL
            .iter()
            .copied()
            .find(|acl| acl.as_str() == short)
            .ok_or_else(|| UnknownAclType(s.to_string()))
    }
}

const READ: &[Action] = &[Action::Read];
const READ_WRITE: &[Action] = &[Action::Read, Action::Write];

/// OWNER-role overrides; `None` falls back to READ + WRITE
fn owner_override(acl: AclType) -> Option<&'static [Action]> {
    match acl {
        AclType::Raw => Some(&[Action::Read, Action::Write, Action::List]),
        AclType::Datasets => Some(&[Action::Read, Action::Write, Action::Owner]),
        AclType::Groups => Some(&[Action::List]),
        AclType::Projects => Some(&[Action::List]),
        AclType::Sessions => Some(&[Action::List, Action::Create]),
        AclType::ThreeD => Some(&[
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
        ]),
        _ => None,
    }
}

/// READ-role overrides; `None` falls back to READ
fn read_override(acl: AclType) -> Option<&'static [Action]> {
    match acl {
        AclType::Raw => Some(&[Action::Read, Action::List]),
        AclType::Groups => Some(&[Action::List]),
        AclType::Projects => Some(&[Action::List]),
        AclType::Sessions => Some(&[Action::List]),
        _ => None,
    }
}

/// ADMIN actions; only admin-designated ACLs have an entry
pub fn admin_actions(acl: AclType) -> Option<&'static [Action]> {
    match acl {
        AclType::Datasets => Some(&[Action::Read, Action::Write, Action::Owner]),
        AclType::Groups => Some(&[
            Action::List,
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
        ]),
        AclType::Projects => Some(&[Action::Read, Action::Update, Action::List]),
        AclType::Sessions => Some(&[Action::List, Action::Create, Action::Delete]),
        _ => None,
    }
}

/// Actions an ACL grants to a role
///
/// READ and OWNER consult their override tables before the defaults. ADMIN
/// only consults its own table and yields `None` for ACLs it does not list.
pub fn role_actions(acl: AclType, role: RoleType) -> Option<&'static [Action]> {
    match role {
        RoleType::Owner => Some(owner_override(acl).unwrap_or(READ_WRITE)),
        RoleType::Read => Some(read_override(acl).unwrap_or(READ)),
        RoleType::Admin => admin_actions(acl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_wire_names() {
        assert_eq!("datasets".parse::<AclType>(), Ok(AclType::Datasets));
        assert_eq!("timeSeriesAcl".parse::<AclType>(), Ok(AclType::TimeSeries));
        assert_eq!(
            "bogus".parse::<AclType>(),
            Err(UnknownAclType("bogus".to_string()))
        );
    }

    #[test]
    fn test_names_round_trip_for_every_acl() {
        for acl in AclType::ALL {
            assert_eq!(acl.wire_name().parse::<AclType>(), Ok(acl));
        }
    }

    #[test]
    fn test_scope_shapes() {
        assert_eq!(AclType::Projects.scope_shape(), ScopeShape::AllOnly);
        assert_eq!(AclType::Raw.scope_shape(), ScopeShape::Table);
        assert_eq!(AclType::DataModels.scope_shape(), ScopeShape::SpaceId);
        assert_eq!(AclType::Datasets.scope_shape(), ScopeShape::Id);
        assert_eq!(AclType::Groups.scope_shape(), ScopeShape::CurrentUser);
        assert_eq!(AclType::TimeSeries.scope_shape(), ScopeShape::DatasetId);
    }

    #[test]
    fn test_action_defaults_and_overrides() {
        assert_eq!(
            role_actions(AclType::Assets, RoleType::Owner),
            Some(READ_WRITE)
        );
        assert_eq!(role_actions(AclType::Assets, RoleType::Read), Some(READ));
        assert_eq!(
            role_actions(AclType::Raw, RoleType::Read),
            Some(&[Action::Read, Action::List][..])
        );
    }

    #[test]
    fn test_admin_table_has_no_fallback() {
        assert_eq!(role_actions(AclType::Assets, RoleType::Admin), None);
        assert!(AclType::Groups.is_admin_designated());
        assert!(!AclType::TimeSeries.is_admin_designated());
    }
}
