use serde::{Deserialize, Serialize};
use smartcheques_core::{Timestamp, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub event_type: String,
    pub title: String,
    pub body: String,
    pub created_at: Timestamp,
}
