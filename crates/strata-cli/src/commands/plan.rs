//! `plan`

use super::Session;
use anyhow::Result;

/// Print the target plan without touching the platform
pub async fn run(session: &Session) -> Result<()> {
    let plan = strata_deploy::plan(&session.config, &session.platform).await?;
    println!("{}", plan.to_json()?);
    Ok(())
}
