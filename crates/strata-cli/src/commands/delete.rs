//! `delete`

use super::Session;
use anyhow::Result;
use chrono::Utc;
use strata_deploy::delete_or_deprecate;

/// Delete or deprecate the resources listed under `[delete-or-deprecate]`
pub async fn run(session: &Session, dry_run: bool) -> Result<()> {
    let report = delete_or_deprecate(&session.config, &session.platform, dry_run, Utc::now()).await?;
    if !dry_run {
        session.persist().await?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
