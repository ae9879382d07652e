//! Delete-or-deprecate command
//!
//! Groups, RAW databases and spaces named in the configuration are deleted
//! when deployed. Datasets cannot be deleted on the platform, so they are
//! renamed with a deprecation marker and flagged in their metadata instead.

use crate::cache::DeployedState;
use crate::dry_run::DryRunPlatform;
use crate::effects::{PlatformEffects, ResourceApi};
use crate::resources::{CachedResource, DataSet, Group, RawDatabase, Space};
use chrono::{DateTime, Utc};
use serde::Serialize;
use strata_core::{BootstrapConfig, DeleteOrDeprecate, NameLimits, Result};
use tracing::{info, warn};

/// Metadata key flagging a deprecated dataset
pub const DEPRECATED_KEY: &str = "deprecated";
/// Metadata key holding the deprecation timestamp
pub const DEPRECATED_AT_KEY: &str = "deprecated_at";
/// Prefix added to the description of a deprecated dataset
pub const DEPRECATED_DESCRIPTION_PREFIX: &str = "[DEPRECATED]";

/// Outcome of a delete run, by resource name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Whether mutations were only simulated
    pub dry_run: bool,
    /// Groups deleted, once per deleted group id
    pub groups_deleted: Vec<String>,
    /// Datasets renamed, as `(old name, new name)`
    pub datasets_deprecated: Vec<(String, String)>,
    /// RAW databases deleted
    pub raw_dbs_deleted: Vec<String>,
    /// Spaces deleted
    pub spaces_deleted: Vec<String>,
    /// Requested names that matched nothing deployed
    pub not_found: Vec<String>,
}

/// `{value}_DEPR_{YYYYmmddHHMMSS}`, with `value` cut so the result fits `limit` characters
pub fn deprecated_name(value: &str, at: DateTime<Utc>, limit: usize) -> String {
    let suffix = format!("_DEPR_{}", at.format("%Y%m%d%H%M%S"));
    let keep = limit.saturating_sub(suffix.chars().count());
    let base: String = value.chars().take(keep).collect();
    format!("{base}{suffix}")
}

/// Deprecated copy of a dataset
pub fn deprecate_dataset(dataset: &DataSet, at: DateTime<Utc>) -> DataSet {
    let mut deprecated = dataset.clone();
    let limits = NameLimits::PLATFORM;
    deprecated.name = deprecated_name(&dataset.name, at, limits.dataset_name);
    deprecated.external_id = dataset
        .external_id
        .as_deref()
        .map(|external_id| deprecated_name(external_id, at, limits.dataset_external_id));
    deprecated.description = Some(match dataset.description.as_deref() {
        Some(description) if !description.is_empty() => {
            format!("{DEPRECATED_DESCRIPTION_PREFIX} {description}")
        }
        _ => DEPRECATED_DESCRIPTION_PREFIX.to_string(),
    });
    deprecated
        .metadata
        .insert(DEPRECATED_KEY.to_string(), "true".to_string());
    deprecated
        .metadata
        .insert(DEPRECATED_AT_KEY.to_string(), at.to_rfc3339());
    deprecated
}

/// Delete or deprecate the resources listed in the configuration
pub async fn delete_or_deprecate<P>(
    config: &BootstrapConfig,
    platform: &P,
    dry_run: bool,
    at: DateTime<Utc>,
) -> Result<DeleteReport>
where
    P: PlatformEffects + ?Sized,
{
    config.validate()?;
    let request = &config.delete_or_deprecate;
    if request.is_empty() {
        info!("nothing listed for deletion");
        return Ok(DeleteReport {
            dry_run,
            ..DeleteReport::default()
        });
    }
    if dry_run {
        run_delete(request, &DryRunPlatform::new(platform), dry_run, at).await
    } else {
        run_delete(request, platform, dry_run, at).await
    }
}

async fn run_delete<P>(
    request: &DeleteOrDeprecate,
    platform: &P,
    dry_run: bool,
    at: DateTime<Utc>,
) -> Result<DeleteReport>
where
    P: PlatformEffects + ?Sized,
{
    let mut state = DeployedState::load(platform).await?;
    let mut report = DeleteReport {
        dry_run,
        ..DeleteReport::default()
    };

    for name in &request.groups {
        let ids = state
            .groups
            .select_by_name(name)
            .iter()
            .map(|group| group.key())
            .collect::<Result<Vec<_>>>()?;
        if ids.is_empty() {
            warn!(name = %name, "group not deployed, skipping");
            report.not_found.push(name.clone());
            continue;
        }
        ResourceApi::<Group>::delete(platform, ids.clone(), false).await?;
        for group in state.groups.delete(&ids) {
            info!(name = %group.name, id = ?group.id, "deleted group");
            report.groups_deleted.push(group.name);
        }
    }

    for name in &request.datasets {
        let matches: Vec<DataSet> = state
            .datasets
            .select_by_name(name)
            .into_iter()
            .cloned()
            .collect();
        if matches.is_empty() {
            warn!(name = %name, "dataset not deployed, skipping");
            report.not_found.push(name.clone());
            continue;
        }
        let deprecated: Vec<DataSet> = matches.iter().map(|d| deprecate_dataset(d, at)).collect();
        let updated = ResourceApi::<DataSet>::update(platform, deprecated).await?;
        for dataset in &updated {
            info!(from = %name, to = %dataset.name, "deprecated dataset");
            report
                .datasets_deprecated
                .push((name.clone(), dataset.name.clone()));
        }
        state.datasets.update(updated)?;
    }

    for name in &request.raw_dbs {
        if state.raw_dbs.select(&[name.clone()]).is_empty() {
            warn!(name = %name, "raw database not deployed, skipping");
            report.not_found.push(name.clone());
            continue;
        }
        ResourceApi::<RawDatabase>::delete(platform, vec![name.clone()], true).await?;
        state.raw_dbs.delete(&[name.clone()]);
        info!(name = %name, "deleted raw database");
        report.raw_dbs_deleted.push(name.clone());
    }

    for name in &request.spaces {
        if state.spaces.select(&[name.clone()]).is_empty() {
            warn!(space = %name, "space not deployed, skipping");
            report.not_found.push(name.clone());
            continue;
        }
        ResourceApi::<Space>::delete(platform, vec![name.clone()], false).await?;
        state.spaces.delete(&[name.clone()]);
        info!(space = %name, "deleted space");
        report.spaces_deleted.push(name.clone());
    }

    Ok(report)
}
