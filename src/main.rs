use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lanyard_rs::{
    api::{LanyardClient, MemoryApi, MerkleApi},
    config::ClientConfig,
    crosscheck::{default_scenarios, run_all},
};

const OFFLINE_ENV: &str = "LANYARD_OFFLINE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api: Box<dyn MerkleApi> = if std::env::var_os(OFFLINE_ENV).is_some() {
        warn!("{} set, checking against the in-memory API", OFFLINE_ENV);
        Box::new(MemoryApi::new())
    } else {
        let config = ClientConfig::from_env().context("reading client config")?;
        info!("Using Lanyard API at {}", config.url);
        Box::new(LanyardClient::new(config).context("building HTTP client")?)
    };

    let scenarios = default_scenarios().context("encoding scenario leaves")?;
    let reports = run_all(api.as_ref(), &scenarios)
        .await
        .context("remote and local trees disagree")?;

    for report in &reports {
        info!(
            "{}: root {} with {} leaves matches local tree",
            report.name, report.root, report.leaf_count
        );
    }

    Ok(())
}
