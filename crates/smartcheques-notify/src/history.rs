use std::collections::{HashMap, VecDeque};

use smartcheques_core::UserId;
use tokio::sync::RwLock;

use crate::notification::Notification;

/// Bounded per-user ring buffer of recently delivered notifications.
pub struct NotificationHistory {
    capacity: usize,
    by_user: RwLock<HashMap<UserId, VecDeque<Notification>>>,
}

impl NotificationHistory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, by_user: RwLock::new(HashMap::new()) }
    }

    pub async fn record(&self, notification: Notification) {
        let mut guard = self.by_user.write().await;
        let buf = guard.entry(notification.user_id).or_default();
        if buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(notification);
    }

    pub async fn get(&self, user_id: &UserId) -> Vec<Notification> {
        self.by_user.read().await.get(user_id).map(|b| b.iter().cloned().collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notification(user_id: UserId, n: u32) -> Notification {
        Notification { user_id, event_type: "test".into(), title: format!("n{n}"), body: String::new(), created_at: Utc::now() }
    }

    #[tokio::test]
    async fn ring_buffer_evicts_oldest_past_capacity() {
        let history = NotificationHistory::new(2);
        let user = UserId::new();
        history.record(notification(user, 1)).await;
        history.record(notification(user, 2)).await;
        history.record(notification(user, 3)).await;

        let stored = history.get(&user).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].title, "n2");
        assert_eq!(stored[1].title, "n3");
    }
}
