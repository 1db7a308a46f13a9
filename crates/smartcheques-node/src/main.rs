//! smartcheques-node — the embedding binary that constructs and drives a
//! [`Coordinator`]. No HTTP or CLI surface: a production deployment wires a
//! REST layer on top of the same subsystems this binary assembles.

use std::sync::Arc;

use smartcheques_auth::AuthEngine;
use smartcheques_core::RecordingPublisher;
use smartcheques_disputes::DisputeEngine;
use smartcheques_ledger::{InMemoryLedgerStore, LedgerEngine};
use smartcheques_milestones::{InMemoryMilestoneStore, MilestoneEngine};
use smartcheques_monitor::{InMemoryMonitorStore, MonitorEngine, NoopMetricSource};
use smartcheques_node::Coordinator;
use smartcheques_notify::{NoopEmailTransport, NoopWebhookTransport, NotificationFabric};
use smartcheques_oracle::{InMemoryOracleStore, NoopTransport, OracleEngine};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,smartcheques=debug".parse().unwrap()),
        )
        .init();

    info!("smart cheques coordinator starting");

    let events: Arc<dyn smartcheques_core::EventPublisher> = Arc::new(RecordingPublisher::new());

    let ledger = Arc::new(LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()), Arc::clone(&events)));
    let oracle = Arc::new(OracleEngine::new(
        Arc::new(InMemoryOracleStore::new()),
        Arc::new(NoopTransport::new(serde_json::json!({}))),
        Arc::clone(&events),
    ));
    let milestones = Arc::new(MilestoneEngine::new(Arc::new(InMemoryMilestoneStore::new()), Arc::clone(&events)));
    let auth = Arc::new(AuthEngine::new(
        Arc::new(smartcheques_auth::InMemoryAuthStore::new()),
        Arc::clone(&ledger),
        Arc::clone(&events),
    ));
    let disputes = Arc::new(DisputeEngine::new(
        Arc::new(smartcheques_disputes::InMemoryDisputeStore::new()),
        Arc::clone(&ledger),
        Arc::clone(&events),
    ));
    let monitor = Arc::new(MonitorEngine::new(
        Arc::new(InMemoryMonitorStore::new()),
        Arc::clone(&events),
        Arc::new(NoopMetricSource),
        Default::default(),
    ));
    let notify = Arc::new(NotificationFabric::new(Arc::new(NoopEmailTransport::new()), Arc::new(NoopWebhookTransport::new())));

    let coordinator = Coordinator::new(ledger, oracle, milestones, auth, disputes, monitor, notify, events);
    coordinator.start();

    info!("coordinator ready");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    coordinator.stop();

    Ok(())
}
