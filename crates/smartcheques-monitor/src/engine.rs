use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use smartcheques_core::constants::{
    DEFAULT_ALERT_CHECK_INTERVAL_SECS, DEFAULT_MONITORING_INTERVAL_SECS,
    DEFAULT_REALTIME_SAMPLE_INTERVAL_SECS,
};
use smartcheques_core::event::event_type;
use smartcheques_core::{AlertId, Event, EventPublisher};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::alert::Alert;
use crate::error::MonitorError;
use crate::store::MonitorStore;
use crate::threshold::{Operator, Severity, Threshold};

#[derive(Clone, Copy, Debug)]
pub struct MetricSample<'a> {
    pub metric: &'a str,
    pub service: &'a str,
    pub value: f64,
}

/// Sampled service-health metrics feed the monitoring and alert-check loops.
/// The engine never reaches into a metrics backend itself, matching the
/// oracle's separation of transport from scoring logic.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn sample(&self) -> Vec<(String, String, f64)>;
}

pub struct NoopMetricSource;

#[async_trait]
impl MetricSource for NoopMetricSource {
    async fn sample(&self) -> Vec<(String, String, f64)> {
        Vec::new()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MonitorConfig {
    pub monitoring_interval: Duration,
    pub alert_check_interval: Duration,
    pub realtime_sample_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitoring_interval: Duration::from_secs(DEFAULT_MONITORING_INTERVAL_SECS),
            alert_check_interval: Duration::from_secs(DEFAULT_ALERT_CHECK_INTERVAL_SECS),
            realtime_sample_interval: Duration::from_secs(DEFAULT_REALTIME_SAMPLE_INTERVAL_SECS),
        }
    }
}

pub struct MonitorEngine {
    store: Arc<dyn MonitorStore>,
    events: Arc<dyn EventPublisher>,
    metrics: Arc<dyn MetricSource>,
    config: MonitorConfig,
    realtime_enabled: AtomicBool,
}

impl MonitorEngine {
    pub fn new(
        store: Arc<dyn MonitorStore>,
        events: Arc<dyn EventPublisher>,
        metrics: Arc<dyn MetricSource>,
        config: MonitorConfig,
    ) -> Self {
        Self { store, events, metrics, config, realtime_enabled: AtomicBool::new(false) }
    }

    pub async fn create_threshold(
        &self,
        metric: String,
        service: String,
        threshold: f64,
        operator: Operator,
        severity: Severity,
    ) -> Result<Threshold, MonitorError> {
        if !threshold.is_finite() {
            return Err(MonitorError::InvalidThreshold);
        }
        let t = Threshold {
            id: smartcheques_core::ThresholdId::new(),
            metric,
            service,
            threshold,
            operator,
            severity,
            active: true,
            created_at: Utc::now(),
        };
        self.store.put_threshold(t.clone()).await?;
        Ok(t)
    }

    pub async fn create_alert(
        &self,
        metric: String,
        service: String,
        value: f64,
        severity: Severity,
        message: String,
        threshold_id: Option<smartcheques_core::ThresholdId>,
    ) -> Result<Alert, MonitorError> {
        let alert = Alert {
            id: AlertId::new(),
            threshold_id,
            metric,
            service,
            value,
            severity,
            message,
            resolved: false,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.store.put_alert(alert.clone()).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::ALERT_CREATED, "monitor")
                    .with("alert_id", alert.id.to_string())
                    .with("metric", alert.metric.clone())
                    .with("service", alert.service.clone()),
            )
            .await
        {
            warn!(alert = %alert.id, "failed to publish alert.created");
        }
        Ok(alert)
    }

    pub async fn resolve_alert(&self, id: &AlertId) -> Result<Alert, MonitorError> {
        let mut alert = self.store.get_alert(id).await?.ok_or_else(|| MonitorError::AlertNotFound(id.to_string()))?;
        alert.resolved = true;
        alert.resolved_at = Some(Utc::now());
        self.store.put_alert(alert.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::ALERT_RESOLVED, "monitor").with("alert_id", alert.id.to_string()))
            .await
        {
            warn!(alert = %alert.id, "failed to publish alert.resolved");
        }
        Ok(alert)
    }

    /// Samples current metrics and fires an alert for every breached
    /// threshold. Suppresses duplicates: a threshold with an unresolved
    /// alert already active does not fire again.
    pub async fn evaluate_thresholds(&self) -> Result<Vec<Alert>, MonitorError> {
        let samples = self.metrics.sample().await;
        let thresholds = self.store.list_active_thresholds().await?;
        let active = self.store.list_active_alerts().await?;

        let mut fired = Vec::new();
        for threshold in &thresholds {
            let already_active = active.iter().any(|a| a.threshold_id == Some(threshold.id));
            if already_active {
                continue;
            }
            for (metric, service, value) in &samples {
                if metric == &threshold.metric && service == &threshold.service && threshold.is_breached(*value) {
                    let alert = self
                        .create_alert(
                            threshold.metric.clone(),
                            threshold.service.clone(),
                            *value,
                            threshold.severity,
                            format!(
                                "{} {:?} {} on {} (value {value})",
                                threshold.metric, threshold.operator, threshold.threshold, threshold.service
                            ),
                            Some(threshold.id),
                        )
                        .await?;
                    fired.push(alert);
                    break;
                }
            }
        }
        Ok(fired)
    }

    pub fn enable_realtime(&self) {
        self.realtime_enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable_realtime(&self) {
        self.realtime_enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_realtime_enabled(&self) -> bool {
        self.realtime_enabled.load(Ordering::SeqCst)
    }

    /// Spawns the service-health loop, the threshold-evaluation loop, and
    /// the real-time sampling loop, each honoring `token`.
    pub fn start(self: &Arc<Self>, token: CancellationToken) {
        let health = Arc::clone(self);
        let health_token = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(health.config.monitoring_interval);
            loop {
                tokio::select! {
                    _ = health_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let samples = health.metrics.sample().await;
                        info!(services = samples.len(), "service health sampled");
                    }
                }
            }
        });

        let alerts = Arc::clone(self);
        let alert_token = token.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(alerts.config.alert_check_interval);
            loop {
                tokio::select! {
                    _ = alert_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = alerts.evaluate_thresholds().await {
                            warn!(error = %e, "threshold evaluation failed");
                        }
                    }
                }
            }
        });

        let realtime = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(realtime.config.realtime_sample_interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if realtime.is_realtime_enabled() {
                            let _ = realtime.metrics.sample().await;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMonitorStore;
    use smartcheques_core::RecordingPublisher;

    struct FixedMetricSource(Vec<(String, String, f64)>);

    #[async_trait]
    impl MetricSource for FixedMetricSource {
        async fn sample(&self) -> Vec<(String, String, f64)> {
            self.0.clone()
        }
    }

    fn engine(samples: Vec<(String, String, f64)>) -> MonitorEngine {
        MonitorEngine::new(
            Arc::new(InMemoryMonitorStore::new()),
            Arc::new(RecordingPublisher::new()),
            Arc::new(FixedMetricSource(samples)),
            MonitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn breached_threshold_fires_alert() {
        let engine = engine(vec![("latency_ms".into(), "oracle".into(), 500.0)]);
        engine
            .create_threshold("latency_ms".into(), "oracle".into(), 200.0, Operator::Gt, Severity::Critical)
            .await
            .unwrap();

        let fired = engine.evaluate_thresholds().await.unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].service, "oracle");
    }

    #[tokio::test]
    async fn duplicate_breach_is_suppressed_while_alert_active() {
        let engine = engine(vec![("latency_ms".into(), "oracle".into(), 500.0)]);
        engine
            .create_threshold("latency_ms".into(), "oracle".into(), 200.0, Operator::Gt, Severity::Critical)
            .await
            .unwrap();

        let first = engine.evaluate_thresholds().await.unwrap();
        assert_eq!(first.len(), 1);
        let second = engine.evaluate_thresholds().await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn resolving_an_alert_allows_it_to_fire_again() {
        let engine = engine(vec![("latency_ms".into(), "oracle".into(), 500.0)]);
        engine
            .create_threshold("latency_ms".into(), "oracle".into(), 200.0, Operator::Gt, Severity::Critical)
            .await
            .unwrap();
        let fired = engine.evaluate_thresholds().await.unwrap();
        engine.resolve_alert(&fired[0].id).await.unwrap();

        let refired = engine.evaluate_thresholds().await.unwrap();
        assert_eq!(refired.len(), 1);
    }
}
