use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartcheques_core::{OracleProviderId, OracleRequestId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Expired,
}

/// One condition-check request against a provider, with its cached outcome.
///
/// `cached_until` governs reuse: a lookup for the same `condition_key` is a
/// cache hit only while `cached_until > now`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleRequest {
    pub id: OracleRequestId,
    pub provider_id: OracleProviderId,
    pub condition_key: String,
    pub status: RequestStatus,
    pub result: Option<Value>,
    pub cached_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OracleRequest {
    pub fn is_cache_hit(&self, now: Timestamp) -> bool {
        self.status == RequestStatus::Completed && self.cached_until.is_some_and(|until| until > now)
    }
}
