use std::collections::HashMap;

use async_trait::async_trait;
use smartcheques_core::{OracleProviderId, Timestamp};
use tokio::sync::RwLock;

use crate::error::OracleError;
use crate::provider::OracleProvider;
use crate::request::OracleRequest;

/// A single recorded outcome, used to compute the rolling error rate.
#[derive(Clone, Copy, Debug)]
pub struct OutcomeRecord {
    pub at: Timestamp,
    pub success: bool,
}

#[async_trait]
pub trait OracleStore: Send + Sync {
    async fn get_provider(&self, id: &OracleProviderId) -> Result<Option<OracleProvider>, OracleError>;
    async fn put_provider(&self, provider: OracleProvider) -> Result<(), OracleError>;
    async fn list_providers(&self) -> Result<Vec<OracleProvider>, OracleError>;

    async fn get_cached(&self, condition_key: &str) -> Result<Option<OracleRequest>, OracleError>;
    async fn put_request(&self, request: OracleRequest) -> Result<(), OracleError>;

    async fn record_outcome(&self, provider_id: &OracleProviderId, record: OutcomeRecord) -> Result<(), OracleError>;
    async fn recent_outcomes(
        &self,
        provider_id: &OracleProviderId,
        since: Timestamp,
    ) -> Result<Vec<OutcomeRecord>, OracleError>;

    /// Drops cached requests whose TTL has elapsed as of `now`. Returns the
    /// number evicted. Reads already treat an expired entry as a miss; this
    /// only reclaims memory for a janitor loop.
    async fn evict_expired(&self, now: Timestamp) -> Result<usize, OracleError>;
}

#[derive(Default)]
pub struct InMemoryOracleStore {
    providers: RwLock<HashMap<OracleProviderId, OracleProvider>>,
    requests_by_condition: RwLock<HashMap<String, OracleRequest>>,
    outcomes: RwLock<HashMap<OracleProviderId, Vec<OutcomeRecord>>>,
}

impl InMemoryOracleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OracleStore for InMemoryOracleStore {
    async fn get_provider(&self, id: &OracleProviderId) -> Result<Option<OracleProvider>, OracleError> {
        Ok(self.providers.read().await.get(id).cloned())
    }

    async fn put_provider(&self, provider: OracleProvider) -> Result<(), OracleError> {
        self.providers.write().await.insert(provider.id, provider);
        Ok(())
    }

    async fn list_providers(&self) -> Result<Vec<OracleProvider>, OracleError> {
        Ok(self.providers.read().await.values().cloned().collect())
    }

    async fn get_cached(&self, condition_key: &str) -> Result<Option<OracleRequest>, OracleError> {
        Ok(self.requests_by_condition.read().await.get(condition_key).cloned())
    }

    async fn put_request(&self, request: OracleRequest) -> Result<(), OracleError> {
        self.requests_by_condition
            .write()
            .await
            .insert(request.condition_key.clone(), request);
        Ok(())
    }

    async fn record_outcome(&self, provider_id: &OracleProviderId, record: OutcomeRecord) -> Result<(), OracleError> {
        self.outcomes.write().await.entry(*provider_id).or_default().push(record);
        Ok(())
    }

    async fn recent_outcomes(
        &self,
        provider_id: &OracleProviderId,
        since: Timestamp,
    ) -> Result<Vec<OutcomeRecord>, OracleError> {
        Ok(self
            .outcomes
            .read()
            .await
            .get(provider_id)
            .map(|records| records.iter().copied().filter(|r| r.at >= since).collect())
            .unwrap_or_default())
    }

    async fn evict_expired(&self, now: Timestamp) -> Result<usize, OracleError> {
        let mut requests = self.requests_by_condition.write().await;
        let before = requests.len();
        requests.retain(|_, req| match req.cached_until {
            Some(until) => until > now,
            None => true,
        });
        Ok(before - requests.len())
    }
}
