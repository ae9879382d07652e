//! Plan export
//!
//! Builds the [`TargetPlan`] against the deployed datasets without mutating
//! anything. Datasets that do not exist yet get stable negative placeholder
//! ids so the plan can be rendered before the first deploy.

use crate::cache::DeployedCache;
use crate::effects::PlatformEffects;
use crate::resources::DataSet;
use std::collections::BTreeMap;
use strata_authorization::{DatasetIdResolver, ResourceTargets, TargetPlan};
use strata_core::{BootstrapConfig, Result};
use tracing::info;

/// Dataset ids for planning: deployed ids first, placeholders otherwise
#[derive(Debug, Clone, Default)]
pub struct PlannedIds {
    ids: BTreeMap<String, i64>,
}

impl PlannedIds {
    /// Resolve every target dataset against the deployed cache
    pub fn new(targets: &ResourceTargets, deployed: &DeployedCache<DataSet>) -> Self {
        let mut placeholder = 0;
        let ids = targets
            .datasets
            .iter()
            .map(|target| {
                let id = deployed.dataset_id(&target.name).unwrap_or_else(|| {
                    placeholder -= 1;
                    placeholder
                });
                (target.name.clone(), id)
            })
            .collect();
        Self { ids }
    }

    /// Number of datasets without a deployed id
    pub fn pending(&self) -> usize {
        self.ids.values().filter(|id| **id < 0).count()
    }
}

impl DatasetIdResolver for PlannedIds {
    fn dataset_id(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }
}

/// Read-only plan of everything a deploy would converge to
pub async fn plan<P>(config: &BootstrapConfig, platform: &P) -> Result<TargetPlan>
where
    P: PlatformEffects + ?Sized,
{
    config.validate()?;
    let mut datasets = DeployedCache::<DataSet>::default();
    datasets.refresh(platform).await?;
    let targets = ResourceTargets::from_config(config, &config.naming());
    let ids = PlannedIds::new(&targets, &datasets);
    if ids.pending() > 0 {
        info!(pending = ids.pending(), "planning with placeholder ids for undeployed datasets");
    }
    TargetPlan::build(config, &ids)
}
