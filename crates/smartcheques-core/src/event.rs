use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Timestamp;

/// The wire shape every subsystem emits on the message bus.
///
/// `data` is a typed JSON map rather than an untyped catch-all struct, per
/// the event-type conventions documented on [`EventType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub timestamp: Timestamp,
    pub data: HashMap<String, Value>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            timestamp: Utc::now(),
            data: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
        self
    }
}

/// Canonical event type strings used across subsystems. Collected here so a
/// typo in one crate doesn't silently diverge from what another listens for.
pub mod event_type {
    pub const ASSET_REGISTERED: &str = "asset.registered";
    pub const ASSET_UPDATED: &str = "asset.updated";
    pub const ASSET_DEACTIVATED: &str = "asset.deactivated";

    pub const BALANCE_INITIALIZED: &str = "balance.initialized";
    pub const BALANCE_OPERATION: &str = "balance.operation";
    pub const BALANCE_FROZEN: &str = "balance.frozen";
    pub const BALANCE_UNFROZEN: &str = "balance.unfrozen";
    pub const BALANCE_EXTERNAL_SYNCED: &str = "balance.external_synced";

    pub const WITHDRAWAL_REQUESTED: &str = "withdrawal.authorization.requested";
    pub const WITHDRAWAL_APPROVED: &str = "withdrawal.authorization.approved";
    pub const WITHDRAWAL_REJECTED: &str = "withdrawal.authorization.rejected";
    pub const WITHDRAWAL_TIME_LOCKED: &str = "withdrawal.authorization.time_locked";
    pub const WITHDRAWAL_TIME_LOCK_RELEASED: &str = "withdrawal.authorization.time_lock_released";

    pub const MILESTONE_PROGRESS: &str = "milestone.progress";
    pub const MILESTONE_COMPLETED: &str = "milestone.completed";
    pub const MILESTONE_FAILED: &str = "milestone.failed";
    pub const MILESTONE_OVERDUE: &str = "milestone.overdue";
    pub const MILESTONE_DEADLINE_APPROACHING: &str = "milestone.deadline_approaching";

    pub const ORACLE_PROVIDER_REGISTERED: &str = "oracle_provider_registered";
    pub const ORACLE_PROVIDER_UPDATED: &str = "oracle_provider_updated";
    pub const ORACLE_PROVIDER_DELETED: &str = "oracle_provider_deleted";

    pub const DISPUTE_INITIATED: &str = "dispute.initiated";
    pub const DISPUTE_RESOLVED: &str = "dispute.resolved";
    pub const REFUND_PROCESSED: &str = "refund.processed";
    pub const PARTIAL_PAYMENT_PROCESSED: &str = "partial_payment.processed";

    pub const ALERT_CREATED: &str = "alert.created";
    pub const ALERT_RESOLVED: &str = "alert.resolved";
}

/// Outbound publication of [`Event`]s to the message bus.
///
/// Publication failures are logged and swallowed by callers — a dead event
/// bus must never fail the originating balance, milestone, or authorization
/// operation. The trait itself stays infallible from the caller's point of
/// view for that reason: implementations report failure via `Ok(false)`
/// rather than `Err`, so call sites never need a `match` to stay compliant.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: Event) -> bool;
}

/// A publisher that records every event in memory. Used by tests and by
/// embedders that have not wired a real bus yet.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: tokio::sync::Mutex<Vec<Event>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: Event) -> bool {
        self.sent.lock().await.push(event);
        true
    }
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.sent.lock().await)
    }
}
