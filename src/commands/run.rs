//! `gardenwatch run`

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::ApiFetcher;
use crate::metrics;
use crate::notifications::{DiscordMessenger, MemoryMessenger, Messenger};
use crate::relay::Relay;
use crate::scheduler::RelayRunner;
use crate::storage::baseline::BaselineStore;
use crate::storage::bindings::ChannelBindings;

/// Flags of the run command
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log messages instead of posting them
    pub dry_run: bool,
    /// One startup pass and one sweep, then exit
    pub once: bool,
}

/// Build a relay from configuration
pub fn build_relay(config: &Config, dry_run: bool) -> Result<Relay> {
    let fetcher = ApiFetcher::with_config(
        &config.api.stock_url,
        &config.api.weather_url,
        config.api.requests_per_second,
        config.request_timeout(),
    )
    .context("Failed to create API fetcher")?;

    let messenger: Arc<dyn Messenger> = if dry_run {
        tracing::info!("Dry run: messages are logged, not posted");
        Arc::new(MemoryMessenger::new())
    } else {
        Arc::new(
            DiscordMessenger::new(config.discord.clone())
                .context("Failed to create Discord client")?,
        )
    };

    let baseline = Arc::new(BaselineStore::load(&config.storage.baseline_path));
    let bindings = ChannelBindings::load(&config.storage.channels_path).with_context(|| {
        format!(
            "Failed to load channel bindings: {}",
            config.storage.channels_path.display()
        )
    })?;

    if bindings.is_empty() {
        tracing::warn!("No channels bound; use `gardenwatch bind` to start posting");
    }

    let mut relay = Relay::new(Arc::new(fetcher), messenger, baseline, bindings)
        .with_bindings_path(&config.storage.channels_path);
    if let Some(url) = &config.relay.invite_url {
        relay = relay.with_invite_url(url.clone());
    }

    Ok(relay)
}

/// Run the relay until Ctrl-C
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    config.validate()?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!("Metrics initialization failed: {}", e);
    }

    let dry_run = options.dry_run || config.relay.dry_run;
    let relay = Arc::new(build_relay(&config, dry_run)?);
    let runner = RelayRunner::new(relay, config.schedule.clone());

    if options.once {
        let report = runner.run_once().await.context("Failed to flush baseline")?;
        println!(
            "Sweep complete: {} posted, {} failed, {} fetch errors",
            report.posted, report.failed, report.fetch_errors
        );
        return Ok(());
    }

    let metrics_task = config.metrics.listen_addr.map(|addr| {
        let mut shutdown_rx = runner.subscribe_shutdown();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.changed().await;
            };
            if let Err(e) = metrics::serve_metrics(addr, shutdown).await {
                tracing::error!(%addr, error = %e, "Metrics endpoint failed");
            }
        })
    });

    let mut handle = runner.start().await;
    if let Some(task) = metrics_task {
        handle.attach("metrics", task);
    }

    tracing::info!("gardenwatch running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown requested");
    handle.shutdown().await.context("Failed to flush baseline")?;
    Ok(())
}
