//! # Strata Authorization - Group Generation
//!
//! **Purpose**: Derive the target resources and access-control groups of a
//! bootstrap configuration.
//!
//! Data flows leaf to root: the [`aggregator`] computes per-role scope
//! contexts, the [`generator`] turns a context into capabilities for one ACL
//! type, and the [`orchestrator`] assembles named groups across the node,
//! namespace, top and root levels. [`targets`] bundles the result into a
//! serialisable plan.
//!
//! Generation is pure. The only external input is a [`DatasetIdResolver`]
//! that maps dataset names to deployed ids.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod acl;
pub mod aggregator;
pub mod capability;
pub mod generator;
pub mod orchestrator;
pub mod targets;

pub use acl::{role_actions, Action, AclType, ScopeShape, UnknownAclType};
pub use aggregator::ScopeAggregator;
pub use capability::{Capability, CapabilityScope};
pub use generator::{make_all_scope_capability, CapabilityGenerator, DatasetIdResolver};
pub use orchestrator::{default_acl_types, GroupDefinition, GroupOrchestrator, IdpSource};
pub use targets::{DatasetTarget, ResourceTargets, SpaceTarget, TargetPlan};
