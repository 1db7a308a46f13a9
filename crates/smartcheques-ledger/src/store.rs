use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use smartcheques_core::{CurrencyCode, EnterpriseId};
use tokio::sync::{Mutex, RwLock};

use crate::asset::SupportedAsset;
use crate::balance::{AssetTransaction, EnterpriseBalance};
use crate::error::LedgerError;

/// The persistence boundary the ledger engine is written against.
///
/// Real deployments back this with a database; tests and embedders without
/// one use [`InMemoryLedgerStore`]. The engine never reaches past this trait
/// for I/O, matching the narrow-collaborator-interface posture used
/// throughout this workspace.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_asset(&self, code: &CurrencyCode) -> Result<Option<SupportedAsset>, LedgerError>;
    async fn put_asset(&self, asset: SupportedAsset) -> Result<(), LedgerError>;
    async fn list_assets(&self) -> Result<Vec<SupportedAsset>, LedgerError>;

    async fn get_balance(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<Option<EnterpriseBalance>, LedgerError>;

    async fn put_balance(&self, balance: EnterpriseBalance) -> Result<(), LedgerError>;

    /// True if any balance still references `code`. Used to gate asset
    /// deactivation.
    async fn any_balance_references(&self, code: &CurrencyCode) -> Result<bool, LedgerError>;

    async fn append_transaction(&self, tx: AssetTransaction) -> Result<(), LedgerError>;

    async fn list_transactions(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<Vec<AssetTransaction>, LedgerError>;

    /// A per-`(enterprise, currency)` mutex the engine locks across an
    /// entire validate+mutate+record operation. Cross-key operations are
    /// never ordered against each other; only same-key operations must be
    /// linearizable.
    async fn lock_key(&self, enterprise_id: &EnterpriseId, currency_code: &CurrencyCode) -> Arc<Mutex<()>>;
}

#[derive(Default)]
pub struct InMemoryLedgerStore {
    assets: RwLock<HashMap<String, SupportedAsset>>,
    balances: RwLock<HashMap<(EnterpriseId, String), EnterpriseBalance>>,
    transactions: RwLock<Vec<AssetTransaction>>,
    key_locks: Mutex<HashMap<(EnterpriseId, String), Arc<Mutex<()>>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_asset(&self, code: &CurrencyCode) -> Result<Option<SupportedAsset>, LedgerError> {
        Ok(self.assets.read().await.get(code.as_str()).cloned())
    }

    async fn put_asset(&self, asset: SupportedAsset) -> Result<(), LedgerError> {
        self.assets.write().await.insert(asset.code.as_str().to_string(), asset);
        Ok(())
    }

    async fn list_assets(&self) -> Result<Vec<SupportedAsset>, LedgerError> {
        Ok(self.assets.read().await.values().cloned().collect())
    }

    async fn get_balance(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<Option<EnterpriseBalance>, LedgerError> {
        let key = (*enterprise_id, currency_code.as_str().to_string());
        Ok(self.balances.read().await.get(&key).cloned())
    }

    async fn put_balance(&self, balance: EnterpriseBalance) -> Result<(), LedgerError> {
        let key = (balance.enterprise_id, balance.currency_code.as_str().to_string());
        self.balances.write().await.insert(key, balance);
        Ok(())
    }

    async fn any_balance_references(&self, code: &CurrencyCode) -> Result<bool, LedgerError> {
        Ok(self
            .balances
            .read()
            .await
            .keys()
            .any(|(_, c)| c == code.as_str()))
    }

    async fn append_transaction(&self, tx: AssetTransaction) -> Result<(), LedgerError> {
        self.transactions.write().await.push(tx);
        Ok(())
    }

    async fn list_transactions(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<Vec<AssetTransaction>, LedgerError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| &t.enterprise_id == enterprise_id && t.currency_code.as_str() == currency_code.as_str())
            .cloned()
            .collect())
    }

    async fn lock_key(&self, enterprise_id: &EnterpriseId, currency_code: &CurrencyCode) -> Arc<Mutex<()>> {
        let key = (*enterprise_id, currency_code.as_str().to_string());
        let mut locks = self.key_locks.lock().await;
        locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}
