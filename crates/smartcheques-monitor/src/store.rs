use std::collections::HashMap;

use async_trait::async_trait;
use smartcheques_core::{AlertId, ThresholdId};
use tokio::sync::RwLock;

use crate::alert::Alert;
use crate::error::MonitorError;
use crate::threshold::Threshold;

/// Active-alerts and performance-threshold tables, each protected by a
/// read-write lock and single-writer within it.
#[async_trait]
pub trait MonitorStore: Send + Sync {
    async fn put_threshold(&self, threshold: Threshold) -> Result<(), MonitorError>;
    async fn get_threshold(&self, id: &ThresholdId) -> Result<Option<Threshold>, MonitorError>;
    async fn list_active_thresholds(&self) -> Result<Vec<Threshold>, MonitorError>;

    async fn put_alert(&self, alert: Alert) -> Result<(), MonitorError>;
    async fn get_alert(&self, id: &AlertId) -> Result<Option<Alert>, MonitorError>;
    async fn list_active_alerts(&self) -> Result<Vec<Alert>, MonitorError>;
}

#[derive(Default)]
pub struct InMemoryMonitorStore {
    thresholds: RwLock<HashMap<ThresholdId, Threshold>>,
    alerts: RwLock<HashMap<AlertId, Alert>>,
}

impl InMemoryMonitorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MonitorStore for InMemoryMonitorStore {
    async fn put_threshold(&self, threshold: Threshold) -> Result<(), MonitorError> {
        self.thresholds.write().await.insert(threshold.id, threshold);
        Ok(())
    }

    async fn get_threshold(&self, id: &ThresholdId) -> Result<Option<Threshold>, MonitorError> {
        Ok(self.thresholds.read().await.get(id).cloned())
    }

    async fn list_active_thresholds(&self) -> Result<Vec<Threshold>, MonitorError> {
        Ok(self.thresholds.read().await.values().filter(|t| t.active).cloned().collect())
    }

    async fn put_alert(&self, alert: Alert) -> Result<(), MonitorError> {
        self.alerts.write().await.insert(alert.id, alert);
        Ok(())
    }

    async fn get_alert(&self, id: &AlertId) -> Result<Option<Alert>, MonitorError> {
        Ok(self.alerts.read().await.get(id).cloned())
    }

    async fn list_active_alerts(&self) -> Result<Vec<Alert>, MonitorError> {
        Ok(self.alerts.read().await.values().filter(|a| !a.resolved).cloned().collect())
    }
}
