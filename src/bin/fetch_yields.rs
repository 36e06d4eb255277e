//! Fetch pool yields and save one snapshot file per chain

use std::process::ExitCode;

use starkfinder_backend::config::YieldsConfig;
use starkfinder_backend::yields::{group_by_chain, write_snapshots, YieldError, YieldsClient};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = YieldsConfig::from_env();

    match run(&config).await {
        Ok(chains) => {
            tracing::info!(chains, dir = %config.data_dir.display(), "Yields snapshot complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Error fetching yields data: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &YieldsConfig) -> Result<usize, YieldError> {
    let client = YieldsClient::new(&config.api_url, config.request_timeout)?;
    let pools = client.fetch_pools().await?;
    let groups = group_by_chain(pools);
    let written = write_snapshots(&config.data_dir, &groups)?;
    Ok(written.len())
}
