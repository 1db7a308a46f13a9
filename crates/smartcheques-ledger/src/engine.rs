use std::sync::Arc;

use chrono::Utc;
use smartcheques_core::event::event_type;
use smartcheques_core::{CurrencyCode, EnterpriseId, Event, EventPublisher, Money, TransactionId};
use tracing::{info, warn};

use crate::asset::{AssetClass, SupportedAsset};
use crate::balance::{
    apply_delta, AssetTransaction, ConsistencyReport, EnterpriseBalance, LedgerOpRequest,
    OperationType, TransactionStatus,
};
use crate::error::LedgerError;
use crate::store::LedgerStore;

/// The Asset Registry and Balance Ledger, combined behind one engine because
/// every balance mutation needs to consult the registry for limits.
///
/// Balance mutations are atomic end-to-end: validation, the in-memory
/// mutation, the appended transaction record, and the event publication all
/// happen while the per-`(enterprise, currency)` lock from the store is
/// held. Event-publication failures are logged and swallowed; persistence
/// failures propagate and abort the operation.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    events: Arc<dyn EventPublisher>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    // ── Asset Registry ───────────────────────────────────────────────────────

    pub async fn register_asset(
        &self,
        code: &str,
        class: AssetClass,
        decimals: u8,
        minimum: Money,
        maximum: Option<Money>,
        transfer_fee: f64,
    ) -> Result<SupportedAsset, LedgerError> {
        let code = CurrencyCode::new(code)?;
        if self.store.get_asset(&code).await?.is_some() {
            return Err(LedgerError::DuplicateCurrency(code.to_string()));
        }
        let now = Utc::now();
        let asset = SupportedAsset {
            code: code.clone(),
            class,
            decimals,
            minimum,
            maximum,
            issuer: None,
            trust_line_limit: None,
            transfer_fee,
            is_frozen: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        asset.validate()?;
        self.store.put_asset(asset.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::ASSET_REGISTERED, "ledger").with("code", code.to_string()))
            .await
        {
            warn!(code = %code, "failed to publish asset.registered");
        }
        info!(code = %code, "asset registered");
        Ok(asset)
    }

    pub async fn get_asset(&self, code: &CurrencyCode) -> Result<SupportedAsset, LedgerError> {
        self.store
            .get_asset(code)
            .await?
            .ok_or_else(|| LedgerError::UnsupportedCurrency(code.to_string()))
    }

    pub async fn deactivate_asset(&self, code: &CurrencyCode) -> Result<(), LedgerError> {
        let mut asset = self.get_asset(code).await?;
        if self.store.any_balance_references(code).await? {
            return Err(LedgerError::AssetInUse(code.to_string()));
        }
        asset.is_active = false;
        asset.updated_at = Utc::now();
        self.store.put_asset(asset).await?;

        if !self
            .events
            .publish(Event::new(event_type::ASSET_DEACTIVATED, "ledger").with("code", code.to_string()))
            .await
        {
            warn!(code = %code, "failed to publish asset.deactivated");
        }
        Ok(())
    }

    // ── Balance Ledger ───────────────────────────────────────────────────────

    pub async fn initialize(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<EnterpriseBalance, LedgerError> {
        self.get_asset(currency_code).await?;
        if let Some(existing) = self.store.get_balance(&enterprise_id, currency_code).await? {
            return Ok(existing);
        }
        let balance = EnterpriseBalance::new(enterprise_id, currency_code.clone(), Utc::now());
        self.store.put_balance(balance.clone()).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::BALANCE_INITIALIZED, "ledger")
                    .with("enterprise_id", enterprise_id.to_string())
                    .with("currency_code", currency_code.to_string()),
            )
            .await
        {
            warn!(enterprise = %enterprise_id, "failed to publish balance.initialized");
        }
        Ok(balance)
    }

    pub async fn get(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<EnterpriseBalance, LedgerError> {
        self.store
            .get_balance(enterprise_id, currency_code)
            .await?
            .ok_or_else(|| LedgerError::BalanceNotFound {
                enterprise: enterprise_id.to_string(),
                currency: currency_code.to_string(),
            })
    }

    /// Validates a request without mutating anything. `process_op` re-runs
    /// this check under the per-key lock to close the TOCTOU window between
    /// an external validate call and the actual mutation.
    pub async fn validate_op(&self, req: &LedgerOpRequest) -> Result<(), LedgerError> {
        let asset = self.get_asset(&req.currency_code).await?;
        if !asset.is_active {
            return Err(LedgerError::CurrencyInactive(req.currency_code.to_string()));
        }
        asset.check_amount(&req.amount)?;

        let existing = self.store.get_balance(&req.enterprise_id, &req.currency_code).await?;
        match existing {
            None if req.op_type.is_debit() || req.op_type == OperationType::EscrowLock => {
                Err(LedgerError::BalanceNotFound {
                    enterprise: req.enterprise_id.to_string(),
                    currency: req.currency_code.to_string(),
                })
            }
            None => Ok(()),
            Some(balance) => {
                if balance.is_frozen {
                    return Err(LedgerError::BalanceFrozen {
                        reason: balance.freeze_reason.unwrap_or_default(),
                    });
                }
                if req.op_type.is_debit() && balance.available < req.amount {
                    return Err(LedgerError::InsufficientAvailable { need: req.amount, available: balance.available });
                }
                Ok(())
            }
        }
    }

    pub async fn check_sufficiency(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
        amount: &Money,
    ) -> Result<bool, LedgerError> {
        let balance = self.get(enterprise_id, currency_code).await?;
        Ok(!balance.is_frozen && balance.available >= *amount)
    }

    /// Validates and applies `req` atomically with respect to other
    /// operations on the same `(enterprise, currency)` key.
    pub async fn process_op(&self, req: LedgerOpRequest) -> Result<AssetTransaction, LedgerError> {
        let lock = self.store.lock_key(&req.enterprise_id, &req.currency_code).await;
        let _guard = lock.lock().await;

        self.validate_op(&req).await?;

        let mut balance = match self.store.get_balance(&req.enterprise_id, &req.currency_code).await? {
            Some(b) => b,
            None => EnterpriseBalance::new(req.enterprise_id, req.currency_code.clone(), Utc::now()),
        };

        let result = apply_delta(&mut balance, req.op_type, req.amount);
        let status = if result.is_ok() { TransactionStatus::Completed } else { TransactionStatus::Failed };
        let tx = AssetTransaction {
            id: TransactionId::new(),
            enterprise_id: req.enterprise_id,
            currency_code: req.currency_code.clone(),
            op_type: req.op_type,
            amount: req.amount,
            reference: req.reference.clone(),
            status,
            metadata: Default::default(),
            created_at: Utc::now(),
        };

        result?;
        balance.updated_at = Utc::now();
        self.store.put_balance(balance).await?;
        self.store.append_transaction(tx.clone()).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::BALANCE_OPERATION, "ledger")
                    .with("enterprise_id", req.enterprise_id.to_string())
                    .with("currency_code", req.currency_code.to_string())
                    .with("op_type", format!("{:?}", req.op_type))
                    .with("amount", req.amount.to_string()),
            )
            .await
        {
            warn!(enterprise = %req.enterprise_id, "failed to publish balance.operation");
        }

        Ok(tx)
    }

    pub async fn reserve(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
        amount: Money,
        reference: Option<String>,
    ) -> Result<AssetTransaction, LedgerError> {
        self.process_op(LedgerOpRequest {
            enterprise_id,
            currency_code: currency_code.clone(),
            op_type: OperationType::EscrowLock,
            amount,
            reference,
        })
        .await
    }

    pub async fn release_reserved(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
        amount: Money,
        reference: Option<String>,
    ) -> Result<AssetTransaction, LedgerError> {
        self.process_op(LedgerOpRequest {
            enterprise_id,
            currency_code: currency_code.clone(),
            op_type: OperationType::EscrowRelease,
            amount,
            reference,
        })
        .await
    }

    pub async fn freeze(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
        reason: String,
    ) -> Result<(), LedgerError> {
        let lock = self.store.lock_key(&enterprise_id, currency_code).await;
        let _guard = lock.lock().await;
        let mut balance = self.get(&enterprise_id, currency_code).await?;
        balance.is_frozen = true;
        balance.freeze_reason = Some(reason.clone());
        balance.updated_at = Utc::now();
        self.store.put_balance(balance).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::BALANCE_FROZEN, "ledger")
                    .with("enterprise_id", enterprise_id.to_string())
                    .with("reason", reason),
            )
            .await
        {
            warn!(enterprise = %enterprise_id, "failed to publish balance.frozen");
        }
        Ok(())
    }

    pub async fn unfreeze(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<(), LedgerError> {
        let lock = self.store.lock_key(&enterprise_id, currency_code).await;
        let _guard = lock.lock().await;
        let mut balance = self.get(&enterprise_id, currency_code).await?;
        balance.is_frozen = false;
        balance.freeze_reason = None;
        balance.updated_at = Utc::now();
        self.store.put_balance(balance).await?;

        if !self
            .events
            .publish(Event::new(event_type::BALANCE_UNFROZEN, "ledger").with("enterprise_id", enterprise_id.to_string()))
            .await
        {
            warn!(enterprise = %enterprise_id, "failed to publish balance.unfrozen");
        }
        Ok(())
    }

    /// Updates the externally-reconciled balance view. Never touches `total`.
    pub async fn sync_external(
        &self,
        enterprise_id: EnterpriseId,
        currency_code: &CurrencyCode,
        external_amount: Money,
    ) -> Result<(), LedgerError> {
        let lock = self.store.lock_key(&enterprise_id, currency_code).await;
        let _guard = lock.lock().await;
        let mut balance = self.get(&enterprise_id, currency_code).await?;
        balance.external = external_amount;
        balance.last_external_sync = Some(Utc::now());
        balance.updated_at = Utc::now();
        self.store.put_balance(balance).await?;
        Ok(())
    }

    pub async fn validate_consistency(
        &self,
        enterprise_id: &EnterpriseId,
        currency_code: &CurrencyCode,
    ) -> Result<ConsistencyReport, LedgerError> {
        let balance = self.get(enterprise_id, currency_code).await?;
        let discrepancy = balance.total.as_decimal() - balance.external.as_decimal();
        Ok(ConsistencyReport {
            enterprise_id: *enterprise_id,
            currency_code: currency_code.clone(),
            total: balance.total,
            external: balance.external,
            is_consistent: discrepancy.is_zero(),
            discrepancy,
            checked_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;
    use smartcheques_core::RecordingPublisher;

    fn engine() -> LedgerEngine {
        LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()), Arc::new(RecordingPublisher::new()))
    }

    async fn register_usdt(engine: &LedgerEngine) {
        engine
            .register_asset("usdt", AssetClass::Stablecoin, 6, Money::parse("1").unwrap(), None, 0.0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deposit_then_withdrawal_updates_total_and_available_together() {
        let engine = engine();
        register_usdt(&engine).await;
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        engine.initialize(enterprise, &usdt).await.unwrap();

        engine
            .process_op(LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: OperationType::Deposit,
                amount: Money::parse("200000").unwrap(),
                reference: None,
            })
            .await
            .unwrap();

        let balance = engine.get(&enterprise, &usdt).await.unwrap();
        assert_eq!(balance.available.to_string(), "200000");
        assert_eq!(balance.total.to_string(), "200000");

        engine
            .process_op(LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: OperationType::Withdrawal,
                amount: Money::parse("50000").unwrap(),
                reference: None,
            })
            .await
            .unwrap();

        let balance = engine.get(&enterprise, &usdt).await.unwrap();
        assert_eq!(balance.available.to_string(), "150000");
        assert_eq!(balance.total.to_string(), "150000");
    }

    #[tokio::test]
    async fn reserve_then_release_restores_available() {
        let engine = engine();
        register_usdt(&engine).await;
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        engine.initialize(enterprise, &usdt).await.unwrap();
        engine
            .process_op(LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: OperationType::Deposit,
                amount: Money::parse("200000").unwrap(),
                reference: None,
            })
            .await
            .unwrap();

        let amount = Money::parse("50000").unwrap();
        engine.reserve(enterprise, &usdt, amount, None).await.unwrap();
        let mid = engine.get(&enterprise, &usdt).await.unwrap();
        assert_eq!(mid.available.to_string(), "150000");
        assert_eq!(mid.reserved.to_string(), "50000");

        engine.release_reserved(enterprise, &usdt, amount, None).await.unwrap();
        let end = engine.get(&enterprise, &usdt).await.unwrap();
        assert_eq!(end.available.to_string(), "200000");
        assert_eq!(end.reserved.to_string(), "0");
    }

    #[tokio::test]
    async fn frozen_balance_rejects_debit() {
        let engine = engine();
        register_usdt(&engine).await;
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        engine.initialize(enterprise, &usdt).await.unwrap();
        engine.freeze(enterprise, &usdt, "fraud review".into()).await.unwrap();

        let result = engine
            .process_op(LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: OperationType::Withdrawal,
                amount: Money::parse("1").unwrap(),
                reference: None,
            })
            .await;
        assert!(matches!(result, Err(LedgerError::BalanceFrozen { .. })));
    }

    #[tokio::test]
    async fn deactivation_blocked_while_balance_references_code() {
        let engine = engine();
        register_usdt(&engine).await;
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        engine.initialize(enterprise, &usdt).await.unwrap();

        let result = engine.deactivate_asset(&usdt).await;
        assert!(matches!(result, Err(LedgerError::AssetInUse(_))));
    }

    #[tokio::test]
    async fn consistency_report_flags_discrepancy() {
        let engine = engine();
        register_usdt(&engine).await;
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        engine.initialize(enterprise, &usdt).await.unwrap();
        engine
            .process_op(LedgerOpRequest {
                enterprise_id: enterprise,
                currency_code: usdt.clone(),
                op_type: OperationType::Deposit,
                amount: Money::parse("10000").unwrap(),
                reference: None,
            })
            .await
            .unwrap();
        engine.sync_external(enterprise, &usdt, Money::parse("8000").unwrap()).await.unwrap();

        let report = engine.validate_consistency(&enterprise, &usdt).await.unwrap();
        assert!(!report.is_consistent);
        assert_eq!(report.discrepancy.to_string(), "2000");
    }
}
