//! Deploy and prepare commands
//!
//! Deploy order matters: datasets first, then RAW databases and spaces, then
//! a settle delay and a fresh dataset listing, and only then groups, because
//! group capabilities reference dataset ids.

use crate::cache::{DeployedCache, DeployedState};
use crate::dry_run::DryRunPlatform;
use crate::effects::{PlatformEffects, ResourceApi};
use crate::resources::{CachedResource, DataSet, Group, RawDatabase, Space};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use strata_authorization::{
    DatasetTarget, GroupDefinition, GroupOrchestrator, ResourceTargets, SpaceTarget,
};
use strata_core::{BootstrapConfig, GroupLevel, Result};
use tracing::{debug, info};

/// Default wait between resource creation and the dataset re-read
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Run options that are not part of the configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Log intended mutations without applying them
    pub dry_run: bool,
    /// Wait before re-reading datasets after creating some
    pub settle_delay: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Outcome of a deploy or prepare run, by resource name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Whether mutations were only simulated
    pub dry_run: bool,
    /// Datasets created
    pub datasets_created: Vec<String>,
    /// Datasets whose description or metadata changed
    pub datasets_updated: Vec<String>,
    /// RAW databases created
    pub raw_dbs_created: Vec<String>,
    /// Spaces created
    pub spaces_created: Vec<String>,
    /// Groups that did not exist before
    pub groups_created: Vec<String>,
    /// Groups recreated with new capabilities
    pub groups_replaced: Vec<String>,
    /// Groups already matching their target
    pub groups_unchanged: Vec<String>,
}

impl DeployReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Number of remote mutations the run issued
    pub fn mutation_count(&self) -> usize {
        self.datasets_created.len()
            + self.datasets_updated.len()
            + self.raw_dbs_created.len()
            + self.spaces_created.len()
            + self.groups_created.len()
            + self.groups_replaced.len()
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "datasets: {} created, {} updated; raw databases: {} created; spaces: {} created; \
             groups: {} created, {} replaced, {} unchanged",
            self.datasets_created.len(),
            self.datasets_updated.len(),
            self.raw_dbs_created.len(),
            self.spaces_created.len(),
            self.groups_created.len(),
            self.groups_replaced.len(),
            self.groups_unchanged.len(),
        )?;
        if self.dry_run {
            f.write_str(" (dry run)")?;
        }
        Ok(())
    }
}

/// Converge the platform to the configuration
pub async fn deploy<P>(
    config: &BootstrapConfig,
    platform: &P,
    options: &DeployOptions,
) -> Result<DeployReport>
where
    P: PlatformEffects + ?Sized,
{
    config.validate()?;
    if options.dry_run {
        run_deploy(config, &DryRunPlatform::new(platform), options).await
    } else {
        run_deploy(config, platform, options).await
    }
}

/// Deploy only the root group, to bootstrap a fresh project
pub async fn prepare<P>(config: &BootstrapConfig, platform: &P, dry_run: bool) -> Result<DeployReport>
where
    P: PlatformEffects + ?Sized,
{
    config.validate()?;
    if dry_run {
        run_prepare(config, &DryRunPlatform::new(platform), true).await
    } else {
        run_prepare(config, platform, false).await
    }
}

async fn run_deploy<P>(
    config: &BootstrapConfig,
    platform: &P,
    options: &DeployOptions,
) -> Result<DeployReport>
where
    P: PlatformEffects + ?Sized,
{
    let naming = config.naming();
    let targets = ResourceTargets::from_config(config, &naming);
    let mut state = DeployedState::load(platform).await?;
    let mut report = DeployReport::new(options.dry_run);
    info!(
        project = %config.project,
        groups = state.groups.len(),
        datasets = state.datasets.len(),
        raw_dbs = state.raw_dbs.len(),
        spaces = state.spaces.len(),
        "loaded deployed state"
    );

    deploy_datasets(platform, &mut state.datasets, &targets.datasets, &mut report).await?;
    deploy_raw_dbs(platform, &mut state.raw_dbs, &targets, &mut report).await?;
    deploy_spaces(platform, &mut state.spaces, &targets.spaces, &mut report).await?;

    if !report.datasets_created.is_empty() {
        if options.dry_run {
            debug!("dry run: keeping synthetic dataset ids, skipping re-read");
        } else {
            info!(
                delay_ms = options.settle_delay.as_millis() as u64,
                "waiting for created datasets to settle"
            );
            tokio::time::sleep(options.settle_delay).await;
            state.datasets.refresh(platform).await?;
        }
    }

    let groups = GroupOrchestrator::new(config, &naming, &state.datasets).generate_all()?;
    for group in &groups {
        reconcile_group(platform, &mut state.groups, group, &mut report).await?;
    }

    info!(%report, "deploy finished");
    Ok(report)
}

async fn run_prepare<P>(config: &BootstrapConfig, platform: &P, dry_run: bool) -> Result<DeployReport>
where
    P: PlatformEffects + ?Sized,
{
    let naming = config.naming();
    let mut groups = DeployedCache::<Group>::default();
    groups.refresh(platform).await?;

    // Root capabilities are all-scoped, so no dataset ids are needed
    let no_datasets: BTreeMap<String, i64> = BTreeMap::new();
    let root = GroupOrchestrator::new(config, &naming, &no_datasets).group_for(&GroupLevel::Root)?;

    let mut report = DeployReport::new(dry_run);
    reconcile_group(platform, &mut groups, &root, &mut report).await?;
    info!(%report, "prepare finished");
    Ok(report)
}

async fn deploy_datasets<P>(
    platform: &P,
    cache: &mut DeployedCache<DataSet>,
    targets: &[DatasetTarget],
    report: &mut DeployReport,
) -> Result<()>
where
    P: PlatformEffects + ?Sized,
{
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    for target in targets {
        match cache.dataset_by_name(&target.name) {
            None => to_create.push(DataSet::from_target(target)),
            Some(existing) if !existing.matches_target(target) => {
                to_update.push(existing.with_target(target));
            }
            Some(_) => debug!(name = %target.name, "dataset up to date"),
        }
    }

    if !to_create.is_empty() {
        let created = ResourceApi::<DataSet>::create(platform, to_create).await?;
        for dataset in &created {
            info!(name = %dataset.name, id = ?dataset.id, "created dataset");
            report.datasets_created.push(dataset.name.clone());
        }
        cache.create(created)?;
    }
    if !to_update.is_empty() {
        let updated = ResourceApi::<DataSet>::update(platform, to_update).await?;
        for dataset in &updated {
            info!(name = %dataset.name, id = ?dataset.id, "updated dataset");
            report.datasets_updated.push(dataset.name.clone());
        }
        cache.update(updated)?;
    }
    Ok(())
}

async fn deploy_raw_dbs<P>(
    platform: &P,
    cache: &mut DeployedCache<RawDatabase>,
    targets: &ResourceTargets,
    report: &mut DeployReport,
) -> Result<()>
where
    P: PlatformEffects + ?Sized,
{
    let missing: Vec<RawDatabase> = targets
        .raw_dbs
        .iter()
        .filter(|name| cache.select(&[(*name).clone()]).is_empty())
        .map(RawDatabase::new)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let created = ResourceApi::<RawDatabase>::create(platform, missing).await?;
    for db in &created {
        info!(name = %db.name, "created raw database");
        report.raw_dbs_created.push(db.name.clone());
    }
    cache.create(created)
}

async fn deploy_spaces<P>(
    platform: &P,
    cache: &mut DeployedCache<Space>,
    targets: &[SpaceTarget],
    report: &mut DeployReport,
) -> Result<()>
where
    P: PlatformEffects + ?Sized,
{
    let missing: Vec<Space> = targets
        .iter()
        .filter(|target| cache.select(&[target.space.clone()]).is_empty())
        .map(Space::from_target)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let created = ResourceApi::<Space>::create(platform, missing).await?;
    for space in &created {
        info!(space = %space.space, "created space");
        report.spaces_created.push(space.space.clone());
    }
    cache.create(created)
}

/// Create or replace one group
///
/// Old groups sharing the name are recorded before the new group is created
/// and deleted only after creation succeeded.
async fn reconcile_group<P>(
    platform: &P,
    cache: &mut DeployedCache<Group>,
    definition: &GroupDefinition,
    report: &mut DeployReport,
) -> Result<()>
where
    P: PlatformEffects + ?Sized,
{
    let target = Group::from_definition(definition);
    let existing = cache.select_by_name(&target.name);
    if let [current] = existing.as_slice() {
        if current.is_equivalent(&target) {
            debug!(name = %target.name, "group unchanged");
            report.groups_unchanged.push(target.name);
            return Ok(());
        }
    }
    let old_ids = existing
        .iter()
        .map(|group| group.key())
        .collect::<Result<Vec<_>>>()?;

    let name = target.name.clone();
    let created = ResourceApi::<Group>::create(platform, vec![target]).await?;
    cache.create(created)?;

    if old_ids.is_empty() {
        info!(name = %name, level = %definition.level, "created group");
        report.groups_created.push(name);
    } else {
        ResourceApi::<Group>::delete(platform, old_ids.clone(), false).await?;
        cache.delete(&old_ids);
        info!(name = %name, replaced = old_ids.len(), "replaced group");
        report.groups_replaced.push(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = DeployReport::new(true);
        report.groups_created.push("cdf:root".to_string());
        assert_eq!(report.mutation_count(), 1);
        assert!(report.to_string().ends_with("(dry run)"));
        assert!(report.to_string().contains("groups: 1 created"));
    }

    #[test]
    fn test_default_settle_delay() {
        assert_eq!(DeployOptions::default().settle_delay, Duration::from_secs(5));
    }
}
