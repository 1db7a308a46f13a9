use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use smartcheques_core::constants::{
    DEFAULT_INAPP_CHANNEL_CAPACITY, DEFAULT_MAX_ALERTS_PER_DAY, DEFAULT_MAX_ALERTS_PER_HOUR,
    DEFAULT_NOTIFICATION_HISTORY_SIZE,
};
use smartcheques_core::UserId;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::connection::ConnectionRegistry;
use crate::error::NotifyError;
use crate::history::NotificationHistory;
use crate::notification::Notification;
use crate::throttle::Throttle;
use crate::transport::{EmailTransport, WebhookTransport};

/// Subject/body template keyed by event type. A template-less event type
/// falls back to a generic rendering of the event name.
fn render_email_template(event_type: &str, data: &Value) -> (String, String) {
    let subject = format!("Smart Cheques: {event_type}");
    let body = match data {
        Value::Object(map) if !map.is_empty() => {
            let fields: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            fields.join("\n")
        }
        _ => format!("Event {event_type} occurred."),
    };
    (subject, body)
}

pub struct NotificationFabric {
    connections: ConnectionRegistry,
    history: NotificationHistory,
    throttle: Throttle,
    email: Arc<dyn EmailTransport>,
    webhook: Arc<dyn WebhookTransport>,
    connection_capacity: usize,
}

impl NotificationFabric {
    pub fn new(email: Arc<dyn EmailTransport>, webhook: Arc<dyn WebhookTransport>) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            history: NotificationHistory::new(DEFAULT_NOTIFICATION_HISTORY_SIZE),
            throttle: Throttle::new(DEFAULT_MAX_ALERTS_PER_HOUR, DEFAULT_MAX_ALERTS_PER_DAY),
            email,
            webhook,
            connection_capacity: DEFAULT_INAPP_CHANNEL_CAPACITY,
        }
    }

    pub async fn connect(&self, user_id: UserId) -> (Uuid, mpsc::Receiver<Notification>) {
        self.connections.register(user_id, self.connection_capacity).await
    }

    pub async fn disconnect(&self, user_id: &UserId, connection_id: Uuid) {
        self.connections.deregister(user_id, connection_id).await;
    }

    /// Delivers an in-app notification to every active connection for
    /// `user_id` and records it in that user's history, regardless of
    /// whether any connection was live to receive it.
    pub async fn notify_in_app(&self, user_id: UserId, event_type: impl Into<String>, title: impl Into<String>, body: impl Into<String>) {
        let notification = Notification {
            user_id,
            event_type: event_type.into(),
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        };
        self.connections.deliver(&notification).await;
        self.history.record(notification).await;
    }

    pub async fn history(&self, user_id: &UserId) -> Vec<Notification> {
        self.history.get(user_id).await
    }

    pub async fn active_connections(&self, user_id: &UserId) -> usize {
        self.connections.active_connection_count(user_id).await
    }

    /// Throttled per-user-per-hour/day. Returns `Ok(false)` (not an error)
    /// when throttled — the caller can decide whether that's loggable.
    pub async fn notify_email(&self, user_id: UserId, to: &str, event_type: &str, data: Value) -> Result<bool, NotifyError> {
        if !self.throttle.allow(user_id).await {
            return Ok(false);
        }
        let (subject, body) = render_email_template(event_type, &data);
        self.email.send(to, &subject, &body).await?;
        Ok(true)
    }

    pub async fn notify_webhook(&self, user_id: UserId, url: &str, payload: Value) -> Result<bool, NotifyError> {
        if !self.throttle.allow(user_id).await {
            return Ok(false);
        }
        if let Err(e) = self.webhook.send(url, payload).await {
            warn!(error = %e, "webhook delivery failed");
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{NoopEmailTransport, NoopWebhookTransport};

    fn fabric() -> NotificationFabric {
        NotificationFabric::new(Arc::new(NoopEmailTransport::new()), Arc::new(NoopWebhookTransport::new()))
    }

    #[tokio::test]
    async fn connected_user_receives_in_app_notification() {
        let fabric = fabric();
        let user = UserId::new();
        let (_id, mut rx) = fabric.connect(user).await;
        fabric.notify_in_app(user, "milestone.completed", "Milestone done", "details").await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, "milestone.completed");
        assert_eq!(fabric.history(&user).await.len(), 1);
    }

    #[tokio::test]
    async fn disconnecting_stops_future_delivery_but_keeps_history() {
        let fabric = fabric();
        let user = UserId::new();
        let (id, _rx) = fabric.connect(user).await;
        fabric.disconnect(&user, id).await;
        fabric.notify_in_app(user, "alert.created", "Alert", "body").await;

        assert_eq!(fabric.active_connections(&user).await, 0);
        assert_eq!(fabric.history(&user).await.len(), 1);
    }

    #[tokio::test]
    async fn email_throttled_past_hourly_cap() {
        let fabric = NotificationFabric {
            throttle: Throttle::new(1, 100),
            ..fabric()
        };
        let user = UserId::new();
        assert!(fabric.notify_email(user, "a@example.com", "alert.created", Value::Null).await.unwrap());
        assert!(!fabric.notify_email(user, "a@example.com", "alert.created", Value::Null).await.unwrap());
    }
}
