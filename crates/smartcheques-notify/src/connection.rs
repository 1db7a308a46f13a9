use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smartcheques_core::UserId;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::notification::Notification;

/// A single registered in-app connection for a user. Delivery is a bounded
/// queue; a full queue marks the connection inactive rather than blocking
/// the fan-out from the shared broadcast channel.
pub struct Connection {
    pub id: Uuid,
    pub user_id: UserId,
    sender: mpsc::Sender<Notification>,
    active: AtomicBool,
}

impl Connection {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Non-blocking delivery attempt. A full queue marks the connection
    /// inactive and the caller drops it on next sweep.
    fn try_deliver(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(_) => self.active.store(false, Ordering::SeqCst),
        }
    }
}

#[derive(Default)]
pub struct ConnectionRegistry {
    by_user: RwLock<HashMap<UserId, Vec<Arc<Connection>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: UserId, capacity: usize) -> (Uuid, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Arc::new(Connection { id: Uuid::new_v4(), user_id, sender: tx, active: AtomicBool::new(true) });
        let id = conn.id;
        self.by_user.write().await.entry(user_id).or_default().push(conn);
        (id, rx)
    }

    pub async fn deregister(&self, user_id: &UserId, connection_id: Uuid) {
        if let Some(conns) = self.by_user.write().await.get_mut(user_id) {
            conns.retain(|c| c.id != connection_id);
        }
    }

    /// Delivers to every active connection for `user_id`; prunes any
    /// connection that goes inactive as a result.
    pub async fn deliver(&self, notification: &Notification) {
        let mut guard = self.by_user.write().await;
        if let Some(conns) = guard.get_mut(&notification.user_id) {
            for conn in conns.iter() {
                conn.try_deliver(notification.clone());
            }
            conns.retain(|c| c.is_active());
        }
    }

    pub async fn active_connection_count(&self, user_id: &UserId) -> usize {
        self.by_user.read().await.get(user_id).map(|c| c.iter().filter(|c| c.is_active()).count()).unwrap_or(0)
    }
}
