//! # Strata Deploy - Reconciliation
//!
//! **Purpose**: Converge a platform project to the targets generated from a
//! bootstrap configuration.
//!
//! The platform is only reached through [`PlatformEffects`]. Each command
//! lists the deployed state once into a [`DeployedState`], diffs it against
//! the targets and issues create, update and delete calls sequentially,
//! keeping the cache in lockstep.
//!
//! Two platforms ship with the crate: [`MemoryPlatform`] for local runs and
//! tests, and the [`DryRunPlatform`] decorator used by every `--dry-run`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod delete;
pub mod deploy;
pub mod dry_run;
pub mod effects;
pub mod memory;
pub mod plan;
pub mod resources;

pub use cache::{DeployedCache, DeployedState};
pub use delete::{delete_or_deprecate, deprecate_dataset, deprecated_name, DeleteReport};
pub use deploy::{deploy, prepare, DeployOptions, DeployReport, DEFAULT_SETTLE_DELAY};
pub use dry_run::DryRunPlatform;
pub use effects::{PlatformEffects, ResourceApi};
pub use memory::{MemoryPlatform, MemoryTable, PlatformSnapshot};
pub use plan::{plan, PlannedIds};
pub use resources::{CachedResource, DataSet, Group, RawDatabase, Space};
