//! Command handlers
//!
//! Every command runs inside a [`Session`]: the validated configuration plus
//! the platform it acts on.

pub mod delete;
pub mod deploy;
pub mod plan;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use strata_core::BootstrapConfig;
use strata_deploy::MemoryPlatform;
use tracing::{info, warn};

/// Configuration and platform for one invocation
pub struct Session {
    /// Validated bootstrap configuration
    pub config: BootstrapConfig,
    /// Platform the commands act on
    pub platform: MemoryPlatform,
    state_path: Option<PathBuf>,
}

impl Session {
    /// Load the configuration and the platform state
    pub fn open(config_path: &Path, state_path: Option<PathBuf>) -> Result<Self> {
        let config = BootstrapConfig::load(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        let platform = match &state_path {
            Some(path) => MemoryPlatform::load(path)
                .with_context(|| format!("loading state {}", path.display()))?,
            None => {
                warn!("no --state file given, changes will not be persisted");
                MemoryPlatform::new()
            }
        };
        info!(project = %config.project, "session opened");
        Ok(Self {
            config,
            platform,
            state_path,
        })
    }

    /// Write the platform back to the state file, if there is one
    pub async fn persist(&self) -> Result<()> {
        if let Some(path) = &self.state_path {
            self.platform
                .save(path)
                .await
                .with_context(|| format!("saving state {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
project = "demo"

[[namespaces]]
ns-name = "src"

[[namespaces.ns-nodes]]
node-name = "src:001:sap"
"#;

    #[tokio::test]
    async fn test_session_round_trips_state() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("strata.toml");
        let state_path = dir.path().join("state.json");
        std::fs::write(&config_path, CONFIG).unwrap();

        let session = Session::open(&config_path, Some(state_path.clone())).unwrap();
        deploy::run(&session, false, 0).await.unwrap();
        assert!(state_path.exists());

        let reopened = Session::open(&config_path, Some(state_path)).unwrap();
        let snapshot = reopened.platform.snapshot().await;
        assert_eq!(snapshot.groups.len(), 7);
        assert_eq!(snapshot.datasets.len(), 3);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(&dir.path().join("absent.toml"), None)
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("absent.toml"));
    }
}
