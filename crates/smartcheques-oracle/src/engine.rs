use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use smartcheques_core::constants::{ORACLE_CACHE_TTL_SECS, ORACLE_HEALTH_WINDOW_SECS, ORACLE_UNHEALTHY_ERROR_RATE};
use smartcheques_core::event::event_type;
use smartcheques_core::{Event, EventPublisher, OracleProviderId};
use tracing::warn;

use crate::error::OracleError;
use crate::provider::{OracleProvider, ProviderType, RateLimit};
use crate::request::{OracleRequest, RequestStatus};
use crate::store::{OracleStore, OutcomeRecord};
use crate::transport::OracleTransport;

/// Provider catalog, request lifecycle, and response cache.
pub struct OracleEngine {
    store: Arc<dyn OracleStore>,
    transport: Arc<dyn OracleTransport>,
    events: Arc<dyn EventPublisher>,
    call_timeout: Duration,
}

impl OracleEngine {
    pub fn new(store: Arc<dyn OracleStore>, transport: Arc<dyn OracleTransport>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, transport, events, call_timeout: Duration::from_secs(10) }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub async fn register_provider(
        &self,
        name: String,
        provider_type: ProviderType,
        endpoint: Option<String>,
        auth_config: Option<String>,
        rate_limit: Option<RateLimit>,
    ) -> Result<OracleProvider, OracleError> {
        let provider = OracleProvider::new(name, provider_type, endpoint, auth_config, rate_limit, Utc::now())?;
        self.store.put_provider(provider.clone()).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::ORACLE_PROVIDER_REGISTERED, "oracle")
                    .with("provider_id", provider.id.to_string()),
            )
            .await
        {
            warn!(provider = %provider.id, "failed to publish oracle_provider_registered");
        }
        Ok(provider)
    }

    pub async fn get_provider(&self, id: &OracleProviderId) -> Result<OracleProvider, OracleError> {
        self.store
            .get_provider(id)
            .await?
            .ok_or_else(|| OracleError::ProviderNotFound(id.to_string()))
    }

    pub async fn list_providers(&self) -> Result<Vec<OracleProvider>, OracleError> {
        self.store.list_providers().await
    }

    /// Resolves a condition against a provider, serving a cache hit when one
    /// is live, otherwise calling the transport and recording the outcome.
    pub async fn resolve(&self, provider_id: OracleProviderId, condition_key: &str) -> Result<OracleRequest, OracleError> {
        let now = Utc::now();
        if let Some(cached) = self.store.get_cached(condition_key).await? {
            if cached.is_cache_hit(now) {
                return Ok(cached);
            }
        }

        let provider = self.get_provider(&provider_id).await?;
        if !provider.is_active {
            return Err(OracleError::ProviderInactive(provider.id.to_string()));
        }

        let outcome = tokio::time::timeout(self.call_timeout, self.transport.submit(&provider, condition_key)).await;

        let (status, result, success) = match outcome {
            Ok(Ok(value)) => (RequestStatus::Completed, Some(value), true),
            Ok(Err(_)) => (RequestStatus::Failed, None, false),
            Err(_) => (RequestStatus::Failed, None, false),
        };

        self.store
            .record_outcome(&provider_id, OutcomeRecord { at: now, success })
            .await?;
        if success {
            self.bump_reliability(&provider).await?;
        }

        let request = OracleRequest {
            id: smartcheques_core::OracleRequestId::new(),
            provider_id,
            condition_key: condition_key.to_string(),
            status,
            result,
            cached_until: if status == RequestStatus::Completed {
                Some(now + chrono::Duration::seconds(ORACLE_CACHE_TTL_SECS))
            } else {
                None
            },
            created_at: now,
            updated_at: now,
        };
        self.store.put_request(request.clone()).await?;
        Ok(request)
    }

    async fn bump_reliability(&self, provider: &OracleProvider) -> Result<(), OracleError> {
        let mut updated = provider.clone();
        updated.reliability = (updated.reliability * 0.95 + 0.05).min(1.0);
        updated.updated_at = Utc::now();
        self.store.put_provider(updated).await
    }

    /// Reclaims cache entries past their TTL. Safe to call on a timer; reads
    /// already treat an expired entry as a miss independently of this.
    pub async fn purge_expired_cache(&self) -> Result<usize, OracleError> {
        self.store.evict_expired(Utc::now()).await
    }

    /// True iff the provider's error rate over the rolling health window is
    /// below the unhealthy threshold.
    pub async fn is_healthy(&self, provider_id: &OracleProviderId) -> Result<bool, OracleError> {
        let since = Utc::now() - chrono::Duration::seconds(ORACLE_HEALTH_WINDOW_SECS);
        let outcomes = self.store.recent_outcomes(provider_id, since).await?;
        if outcomes.is_empty() {
            return Ok(true);
        }
        let failures = outcomes.iter().filter(|o| !o.success).count() as f64;
        let error_rate = failures / outcomes.len() as f64;
        Ok(error_rate < ORACLE_UNHEALTHY_ERROR_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOracleStore;
    use crate::transport::NoopTransport;
    use smartcheques_core::RecordingPublisher;

    fn engine(outcome: serde_json::Value) -> OracleEngine {
        OracleEngine::new(
            Arc::new(InMemoryOracleStore::new()),
            Arc::new(NoopTransport::new(outcome)),
            Arc::new(RecordingPublisher::new()),
        )
    }

    #[tokio::test]
    async fn resolve_caches_completed_result() {
        let engine = engine(serde_json::json!({"verified": true}));
        let provider = engine
            .register_provider("chain-rpc".into(), ProviderType::Api, Some("https://example".into()), None, None)
            .await
            .unwrap();

        let first = engine.resolve(provider.id, "milestone-1").await.unwrap();
        assert_eq!(first.status, RequestStatus::Completed);

        let second = engine.resolve(provider.id, "milestone-1").await.unwrap();
        assert_eq!(second.id, first.id, "second lookup should be served from cache, not a new request");
    }

    #[tokio::test]
    async fn inactive_provider_is_rejected() {
        let engine = engine(serde_json::json!({}));
        let mut provider = engine
            .register_provider("ops".into(), ProviderType::Manual, None, None, None)
            .await
            .unwrap();
        provider.is_active = false;
        engine.store.put_provider(provider.clone()).await.unwrap();

        let result = engine.resolve(provider.id, "x").await;
        assert!(matches!(result, Err(OracleError::ProviderInactive(_))));
    }

    #[tokio::test]
    async fn healthy_with_no_history() {
        let engine = engine(serde_json::json!({}));
        let id = OracleProviderId::new();
        assert!(engine.is_healthy(&id).await.unwrap());
    }
}
