use serde::{Deserialize, Serialize};
use smartcheques_core::{OracleProviderId, Timestamp};

use crate::error::OracleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    Api,
    Webhook,
    Manual,
    Hybrid,
}

impl ProviderType {
    fn requires_endpoint(&self) -> bool {
        matches!(self, ProviderType::Api | ProviderType::Webhook)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests_per_second: u32,
    pub burst_limit: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_second: smartcheques_core::constants::DEFAULT_REQUESTS_PER_SECOND,
            burst_limit: smartcheques_core::constants::DEFAULT_BURST_LIMIT,
        }
    }
}

/// A registered source of truth for milestone verification conditions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleProvider {
    pub id: OracleProviderId,
    pub name: String,
    pub provider_type: ProviderType,
    pub endpoint: Option<String>,
    pub auth_config: Option<String>,
    pub rate_limit: RateLimit,
    pub reliability: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OracleProvider {
    pub fn new(
        name: String,
        provider_type: ProviderType,
        endpoint: Option<String>,
        auth_config: Option<String>,
        rate_limit: Option<RateLimit>,
        now: Timestamp,
    ) -> Result<Self, OracleError> {
        if name.trim().is_empty() {
            return Err(OracleError::EmptyName);
        }
        if provider_type.requires_endpoint() && endpoint.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(OracleError::EndpointRequired);
        }
        Ok(Self {
            id: OracleProviderId::new(),
            name,
            provider_type,
            endpoint,
            auth_config,
            rate_limit: rate_limit.unwrap_or_default(),
            reliability: 1.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_provider_requires_endpoint() {
        let result = OracleProvider::new("chain-rpc".into(), ProviderType::Api, None, None, None, chrono::Utc::now());
        assert!(matches!(result, Err(OracleError::EndpointRequired)));
    }

    #[test]
    fn manual_provider_does_not_require_endpoint() {
        let result = OracleProvider::new("ops-team".into(), ProviderType::Manual, None, None, None, chrono::Utc::now());
        assert!(result.is_ok());
    }

    #[test]
    fn new_provider_starts_fully_reliable() {
        let provider =
            OracleProvider::new("ops-team".into(), ProviderType::Manual, None, None, None, chrono::Utc::now()).unwrap();
        assert_eq!(provider.reliability, 1.0);
        assert!(provider.is_active);
    }
}
