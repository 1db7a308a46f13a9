use std::collections::HashMap;

use async_trait::async_trait;
use smartcheques_core::{EnterpriseId, WithdrawalRequestId};
use tokio::sync::RwLock;

use crate::error::AuthError;
use crate::withdrawal::WithdrawalAuthorization;

#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn get(&self, id: &WithdrawalRequestId) -> Result<Option<WithdrawalAuthorization>, AuthError>;
    async fn put(&self, request: WithdrawalAuthorization) -> Result<(), AuthError>;
    async fn list_by_enterprise(&self, enterprise_id: &EnterpriseId) -> Result<Vec<WithdrawalAuthorization>, AuthError>;
}

#[derive(Default)]
pub struct InMemoryAuthStore {
    requests: RwLock<HashMap<WithdrawalRequestId, WithdrawalAuthorization>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn get(&self, id: &WithdrawalRequestId) -> Result<Option<WithdrawalAuthorization>, AuthError> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn put(&self, request: WithdrawalAuthorization) -> Result<(), AuthError> {
        self.requests.write().await.insert(request.id, request);
        Ok(())
    }

    async fn list_by_enterprise(&self, enterprise_id: &EnterpriseId) -> Result<Vec<WithdrawalAuthorization>, AuthError> {
        let mut out: Vec<_> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| &r.enterprise_id == enterprise_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }
}
