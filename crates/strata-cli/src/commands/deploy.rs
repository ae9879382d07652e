//! `deploy` and `prepare`

use super::Session;
use anyhow::Result;
use std::time::Duration;
use strata_deploy::{deploy, prepare, DeployOptions, DeployReport};

/// Converge the platform to the configuration
pub async fn run(session: &Session, dry_run: bool, settle_delay_secs: u64) -> Result<()> {
    let options = DeployOptions {
        dry_run,
        settle_delay: Duration::from_secs(settle_delay_secs),
    };
    let report = deploy(&session.config, &session.platform, &options).await?;
    finish(session, &report).await
}

/// Deploy only the root group
pub async fn run_prepare(session: &Session, dry_run: bool) -> Result<()> {
    let report = prepare(&session.config, &session.platform, dry_run).await?;
    finish(session, &report).await
}

async fn finish(session: &Session, report: &DeployReport) -> Result<()> {
    if !report.dry_run {
        session.persist().await?;
    }
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
