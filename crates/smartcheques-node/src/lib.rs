//! Coordinator — owns `Arc`-shared handles to every subsystem plus the
//! shared state named for the concurrency model, and drives the
//! background loops (Payment Monitor's tickers, the oracle cache janitor,
//! the notification fabric). No HTTP or CLI surface lives here; an
//! embedding binary constructs and drives a `Coordinator`.

use std::sync::Arc;
use std::time::Duration;

use smartcheques_auth::AuthEngine;
use smartcheques_core::{Event, EventPublisher};
use smartcheques_disputes::DisputeEngine;
use smartcheques_ledger::LedgerEngine;
use smartcheques_milestones::MilestoneEngine;
use smartcheques_monitor::MonitorEngine;
use smartcheques_notify::NotificationFabric;
use smartcheques_oracle::OracleEngine;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct Coordinator {
    pub ledger: Arc<LedgerEngine>,
    pub oracle: Arc<OracleEngine>,
    pub milestones: Arc<MilestoneEngine>,
    pub auth: Arc<AuthEngine>,
    pub disputes: Arc<DisputeEngine>,
    pub monitor: Arc<MonitorEngine>,
    pub notify: Arc<NotificationFabric>,
    events: Arc<dyn EventPublisher>,
    oracle_janitor_interval: Duration,
    token: CancellationToken,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<LedgerEngine>,
        oracle: Arc<OracleEngine>,
        milestones: Arc<MilestoneEngine>,
        auth: Arc<AuthEngine>,
        disputes: Arc<DisputeEngine>,
        monitor: Arc<MonitorEngine>,
        notify: Arc<NotificationFabric>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ledger,
            oracle,
            milestones,
            auth,
            disputes,
            monitor,
            notify,
            events,
            oracle_janitor_interval: Duration::from_secs(3600),
            token: CancellationToken::new(),
        }
    }

    pub fn with_oracle_janitor_interval(mut self, interval: Duration) -> Self {
        self.oracle_janitor_interval = interval;
        self
    }

    /// Starts every background loop: the Payment Monitor's service-health,
    /// alert-check, and real-time tickers, and the oracle cache janitor.
    /// Each honors the coordinator's shared cancellation token.
    pub fn start(&self) {
        self.monitor.start(self.token.clone());

        let oracle = Arc::clone(&self.oracle);
        let interval = self.oracle_janitor_interval;
        let token = self.token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match oracle.purge_expired_cache().await {
                            Ok(evicted) if evicted > 0 => info!(evicted, "oracle cache janitor swept expired entries"),
                            Ok(_) => {}
                            Err(e) => warn!(error = %e, "oracle cache janitor sweep failed"),
                        }
                    }
                }
            }
        });

        info!("coordinator background loops started");
    }

    /// Signals every background loop to shut down. Does not block on their
    /// exit; callers that need that should `JoinHandle::await` the tasks
    /// `start` spawns (kept internal here, matching the node binary's needs).
    pub fn stop(&self) {
        self.token.cancel();
        info!("coordinator shutdown signaled");
    }

    pub async fn publish(&self, event: Event) -> bool {
        self.events.publish(event).await
    }
}
