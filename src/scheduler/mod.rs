//! Periodic drivers for the relay
//!
//! # Overview
//!
//! One startup pass and three independent drivers share the same [`Relay`]:
//!
//! | Driver | Default period | Work |
//! |--------|----------------|------|
//! | startup | once | weather check in restart mode |
//! | fast | 20 s | weather + announcements |
//! | sweep | 300 s | weather + announcements + all stock categories |
//! | refresh | 5 s | re-render tracked events, expire, re-check |
//!
//! Drivers may overlap in time. Overlapping checks of the same category are
//! safe because reservation in the baseline is atomic.
//!
//! # Shutdown
//!
//! Each driver selects between its next tick and a shutdown signal, so a
//! cycle that has started always runs to completion. Re-checks spawned by
//! the refresh driver are drained before it exits, and the baseline is
//! flushed once every driver has stopped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::metrics;
use crate::models::Category;
use crate::relay::{CheckMode, CheckOutcome, CycleReport, Relay};
use crate::tracker::RecheckTarget;
use crate::utils::error::StorageError;
use crate::utils::now_unix;

// ============================================================================
// Runner
// ============================================================================

/// Starts and owns the relay drivers
pub struct RelayRunner {
    relay: Arc<Relay>,
    schedule: ScheduleConfig,
    shutdown: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RelayRunner {
    pub fn new(relay: Arc<Relay>, schedule: ScheduleConfig) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        Self {
            relay,
            schedule,
            shutdown,
            shutdown_rx,
        }
    }

    pub fn relay(&self) -> &Arc<Relay> {
        &self.relay
    }

    /// Receiver that flips to `true` when shutdown starts
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Recognize weather that was already active before this process started
    pub async fn startup_pass(&self) -> Option<CheckOutcome> {
        if self.relay.channel_for(Category::Weather).await.is_none() {
            tracing::debug!("Weather unbound, skipping startup pass");
            return None;
        }

        match self.relay.check_weather(CheckMode::Restart).await {
            Ok(outcome) => {
                tracing::info!(posted = outcome.posted(), "Startup weather pass complete");
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Startup weather pass failed");
                metrics::record_fetch_error("weather");
                None
            }
        }
    }

    /// Run the startup pass, then spawn all drivers
    pub async fn start(self) -> RelayHandle {
        self.startup_pass().await;

        tracing::info!(
            fast_secs = self.schedule.fast_poll_secs,
            sweep_secs = self.schedule.full_sweep_secs,
            refresh_secs = self.schedule.refresh_secs,
            "Starting relay drivers"
        );

        let tasks = vec![
            (
                "fast",
                self.spawn_poll_driver("fast", self.schedule.fast_poll_interval(), |relay| async move {
                    relay.reload_bindings().await;
                    relay.fast_cycle().await
                }),
            ),
            (
                "sweep",
                self.spawn_poll_driver("sweep", self.schedule.full_sweep_interval(), |relay| async move {
                    relay.full_sweep().await
                }),
            ),
            ("refresh", self.spawn_refresh_driver()),
        ];

        RelayHandle {
            tasks,
            shutdown: self.shutdown,
            relay: self.relay,
        }
    }

    /// Startup pass plus one full sweep, then flush the baseline
    pub async fn run_once(&self) -> Result<CycleReport, StorageError> {
        let startup = self.startup_pass().await;
        let mut report = self.relay.full_sweep().await;
        if let Some(outcome) = startup {
            report.absorb("weather", Ok(outcome));
        }
        self.relay.baseline().persist().await?;

        tracing::info!(
            posted = report.posted,
            failed = report.failed,
            fetch_errors = report.fetch_errors,
            "Single sweep complete"
        );
        Ok(report)
    }

    /// Spawn a driver that runs `cycle` on every tick
    fn spawn_poll_driver<F, Fut>(
        &self,
        name: &'static str,
        period: Duration,
        cycle: F,
    ) -> JoinHandle<()>
    where
        F: Fn(Arc<Relay>) -> Fut + Send + 'static,
        Fut: Future<Output = CycleReport> + Send + 'static,
    {
        let relay = self.relay.clone();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _timer = metrics::start_cycle_timer(name);
                        let report = cycle(relay.clone()).await;
                        if report.posted + report.failed + report.fetch_errors > 0 {
                            tracing::info!(
                                driver = name,
                                posted = report.posted,
                                failed = report.failed,
                                fetch_errors = report.fetch_errors,
                                "Cycle complete"
                            );
                        } else {
                            tracing::debug!(driver = name, "Cycle complete, nothing new");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!(driver = name, "Driver shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Spawn the refresh driver
    fn spawn_refresh_driver(&self) -> JoinHandle<()> {
        let relay = self.relay.clone();
        let period = self.schedule.refresh_interval();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut rechecks = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _timer = metrics::start_cycle_timer("refresh");
                        for target in relay.refresh_tick(now_unix()).await {
                            let relay = relay.clone();
                            rechecks.spawn(async move {
                                match relay.recheck(target).await {
                                    Ok(outcome) => {
                                        tracing::debug!(recheck = %target, ?outcome, "Re-check complete");
                                    }
                                    Err(e) => {
                                        tracing::warn!(recheck = %target, error = %e, "Re-check fetch failed");
                                        let source = match target {
                                            RecheckTarget::Weather => "weather",
                                            _ => "stock",
                                        };
                                        metrics::record_fetch_error(source);
                                    }
                                }
                            });
                        }

                        while let Some(result) = rechecks.try_join_next() {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Re-check task failed");
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!(driver = "refresh", pending = rechecks.len(), "Driver shutting down");
                        break;
                    }
                }
            }

            while let Some(result) = rechecks.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Re-check task failed");
                }
            }
        })
    }
}

// ============================================================================
// Relay Handle
// ============================================================================

/// Handle to the running drivers
pub struct RelayHandle {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    shutdown: watch::Sender<bool>,
    relay: Arc<Relay>,
}

impl RelayHandle {
    pub fn relay(&self) -> &Arc<Relay> {
        &self.relay
    }

    /// Track an extra task that stops on the same shutdown signal
    pub fn attach(&mut self, name: &'static str, task: JoinHandle<()>) {
        self.tasks.push((name, task));
    }

    /// Check if every task is still running
    pub fn is_running(&self) -> bool {
        self.tasks.iter().all(|(_, task)| !task.is_finished())
    }

    /// Signal shutdown, wait for every task, then flush the baseline
    pub async fn shutdown(self) -> Result<(), StorageError> {
        let _ = self.shutdown.send(true);

        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(task = name, error = %e, "Task ended abnormally");
            }
        }

        self.relay.baseline().persist().await?;
        tracing::info!("Relay stopped, baseline flushed");
        Ok(())
    }
}
