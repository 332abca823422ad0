use std::sync::Arc;

use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use tokio::sync::watch;

use swap_runner::{
    config::RunnerConfig,
    domain::{BatchRunner, SwapExecutor},
    logging::setup_logging,
    services::provider::{EvmProvider, EvmProviderTrait},
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Load environment variables from .env file
    dotenv().ok();

    setup_logging()?;

    let config = RunnerConfig::from_env().wrap_err("Invalid configuration")?;
    info!(
        "Swapping {} with router {} ({} attempts per wallet)",
        config.intent, config.executor.router, config.batch.attempts_per_wallet
    );

    let provider = EvmProvider::new(
        &config.rpc_url,
        config.rpc_timeout_seconds,
        config.retry.clone(),
    )?;
    let block = provider
        .get_block_number()
        .await
        .wrap_err_with(|| format!("RPC endpoint {} is not reachable", config.rpc_url))?;
    info!("Connected to {} at block {}", config.rpc_url, block);

    let credentials = config.credentials.open()?;
    if credentials.is_empty() {
        warn!("No wallets configured, nothing to do");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown requested, stopping after the current step");
            let _ = shutdown_tx.send(true);
        }
    });

    let executor = SwapExecutor::new(Arc::new(provider), config.executor.clone());
    let runner = BatchRunner::new(executor, config.batch.clone());
    let report = runner
        .run(credentials.as_ref(), &config.intent, shutdown_rx)
        .await;

    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!("Batch report: {}", json),
        Err(e) => warn!("Failed to serialize batch report: {}", e),
    }
    for (kind, count) in report.failures_by_kind() {
        info!("  {}: {}", kind, count);
    }
    if let Some(reason) = &report.aborted {
        error!("Run aborted: {}", reason);
        color_eyre::eyre::bail!("run aborted: {reason}");
    }
    Ok(())
}
