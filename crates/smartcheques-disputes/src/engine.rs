use std::sync::Arc;

use chrono::Utc;
use smartcheques_core::event::event_type;
use smartcheques_core::{CurrencyCode, DisputeId, EnterpriseId, Event, EventPublisher, Money, PartialPaymentId, RefundId, SmartChequeId};
use smartcheques_ledger::{LedgerEngine, LedgerOpRequest, OperationType};
use tracing::warn;

use crate::dispute::{Dispute, DisputeStatus, Priority};
use crate::error::DisputeError;
use crate::refund::{can_transition, PartialPayment, RecordStatus, Refund, RefundType};
use crate::store::DisputeStore;

pub struct DisputeEngine {
    store: Arc<dyn DisputeStore>,
    ledger: Arc<LedgerEngine>,
    events: Arc<dyn EventPublisher>,
}

impl DisputeEngine {
    pub fn new(store: Arc<dyn DisputeStore>, ledger: Arc<LedgerEngine>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, ledger, events }
    }

    pub async fn initiate(
        &self,
        enterprise_id: EnterpriseId,
        smart_cheque_id: SmartChequeId,
        title: String,
        category: String,
        priority: Priority,
        disputed_amount: Option<Money>,
    ) -> Result<Dispute, DisputeError> {
        let now = Utc::now();
        let dispute = Dispute {
            id: DisputeId::new(),
            enterprise_id,
            smart_cheque_id,
            title,
            category,
            priority,
            status: DisputeStatus::Initiated,
            disputed_amount,
            evidence: Vec::new(),
            metadata: Default::default(),
            created_at: now,
            updated_at: now,
        };
        self.store.put_dispute(dispute.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::DISPUTE_INITIATED, "disputes").with("dispute_id", dispute.id.to_string()))
            .await
        {
            warn!(dispute = %dispute.id, "failed to publish dispute.initiated");
        }
        Ok(dispute)
    }

    pub async fn get(&self, id: &DisputeId) -> Result<Dispute, DisputeError> {
        self.store.get_dispute(id).await?.ok_or_else(|| DisputeError::NotFound(id.to_string()))
    }

    pub async fn resolve(&self, id: &DisputeId) -> Result<Dispute, DisputeError> {
        let mut dispute = self.get(id).await?;
        dispute.status = DisputeStatus::Resolved;
        dispute.updated_at = Utc::now();
        self.store.put_dispute(dispute.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::DISPUTE_RESOLVED, "disputes").with("dispute_id", dispute.id.to_string()))
            .await
        {
            warn!(dispute = %dispute.id, "failed to publish dispute.resolved");
        }
        Ok(dispute)
    }

    pub async fn close(&self, id: &DisputeId) -> Result<Dispute, DisputeError> {
        let mut dispute = self.get(id).await?;
        dispute.status = DisputeStatus::Closed;
        dispute.updated_at = Utc::now();
        self.store.put_dispute(dispute.clone()).await?;
        Ok(dispute)
    }

    pub async fn create_refund(
        &self,
        dispute_id: DisputeId,
        smart_cheque_amount: Money,
        amount: Money,
        reason: String,
        refund_type: RefundType,
        requested_by: String,
    ) -> Result<Refund, DisputeError> {
        let dispute = self.get(&dispute_id).await?;
        if !dispute.is_refundable() {
            return Err(DisputeError::NotRefundable(dispute_id.to_string()));
        }
        if amount.is_zero() || amount > smart_cheque_amount {
            return Err(DisputeError::InvalidRefundAmount { max: smart_cheque_amount.to_string() });
        }

        let now = Utc::now();
        let refund = Refund {
            id: RefundId::new(),
            dispute_id,
            smart_cheque_id: dispute.smart_cheque_id,
            amount,
            reason,
            refund_type,
            requested_by,
            status: RecordStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.put_refund(refund.clone()).await?;
        Ok(refund)
    }

    pub async fn create_partial_payment(
        &self,
        dispute_id: DisputeId,
        original_amount: Money,
        amount: Money,
        milestone_completed: Option<bool>,
    ) -> Result<PartialPayment, DisputeError> {
        let dispute = self.get(&dispute_id).await?;
        if !dispute.is_refundable() {
            return Err(DisputeError::NotRefundable(dispute_id.to_string()));
        }
        if amount.is_zero() || amount >= original_amount {
            return Err(DisputeError::InvalidPartialAmount { original: original_amount.to_string() });
        }

        let now = Utc::now();
        let payment = PartialPayment {
            id: PartialPaymentId::new(),
            dispute_id,
            smart_cheque_id: dispute.smart_cheque_id,
            amount,
            original_amount,
            milestone_completed,
            status: RecordStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.put_partial_payment(payment.clone()).await?;
        Ok(payment)
    }

    pub async fn approve_refund(&self, id: &RefundId) -> Result<Refund, DisputeError> {
        self.transition_refund(id, RecordStatus::Approved).await
    }

    /// Only `execute` touches the Balance Ledger: a refund credits the
    /// enterprise's available balance for the disputed currency.
    pub async fn execute_refund(
        &self,
        id: &RefundId,
        enterprise_id: EnterpriseId,
        currency_code: CurrencyCode,
    ) -> Result<Refund, DisputeError> {
        let mut refund = self.get_refund(id).await?;
        if !can_transition(refund.status, RecordStatus::Executing) {
            return Err(DisputeError::InvalidTransition {
                record: "refund".into(),
                from: format!("{:?}", refund.status),
                to: "executing".into(),
            });
        }
        refund.status = RecordStatus::Executing;
        refund.updated_at = Utc::now();
        self.store.put_refund(refund.clone()).await?;

        self.ledger
            .process_op(LedgerOpRequest {
                enterprise_id,
                currency_code,
                op_type: OperationType::Refund,
                amount: refund.amount,
                reference: Some(refund.id.to_string()),
            })
            .await?;

        refund.status = RecordStatus::Completed;
        refund.updated_at = Utc::now();
        self.store.put_refund(refund.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::REFUND_PROCESSED, "disputes").with("refund_id", refund.id.to_string()))
            .await
        {
            warn!(refund = %refund.id, "failed to publish refund.processed");
        }
        Ok(refund)
    }

    async fn get_refund(&self, id: &RefundId) -> Result<Refund, DisputeError> {
        self.store.get_refund(id).await?.ok_or_else(|| DisputeError::RefundNotFound(id.to_string()))
    }

    async fn transition_refund(&self, id: &RefundId, to: RecordStatus) -> Result<Refund, DisputeError> {
        let mut refund = self.get_refund(id).await?;
        if !can_transition(refund.status, to) {
            return Err(DisputeError::InvalidTransition {
                record: "refund".into(),
                from: format!("{:?}", refund.status),
                to: format!("{to:?}"),
            });
        }
        refund.status = to;
        refund.updated_at = Utc::now();
        self.store.put_refund(refund.clone()).await?;
        Ok(refund)
    }

    pub async fn execute_partial_payment(
        &self,
        id: &PartialPaymentId,
        enterprise_id: EnterpriseId,
        currency_code: CurrencyCode,
    ) -> Result<PartialPayment, DisputeError> {
        let mut payment = self
            .store
            .get_partial_payment(id)
            .await?
            .ok_or_else(|| DisputeError::PartialPaymentNotFound(id.to_string()))?;
        if !can_transition(payment.status, RecordStatus::Executing) {
            return Err(DisputeError::InvalidTransition {
                record: "partial_payment".into(),
                from: format!("{:?}", payment.status),
                to: "executing".into(),
            });
        }
        payment.status = RecordStatus::Executing;
        self.store.put_partial_payment(payment.clone()).await?;

        self.ledger
            .process_op(LedgerOpRequest {
                enterprise_id,
                currency_code,
                op_type: OperationType::Refund,
                amount: payment.amount,
                reference: Some(payment.id.to_string()),
            })
            .await?;

        payment.status = RecordStatus::Completed;
        payment.updated_at = Utc::now();
        self.store.put_partial_payment(payment.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::PARTIAL_PAYMENT_PROCESSED, "disputes").with("partial_payment_id", payment.id.to_string()))
            .await
        {
            warn!(payment = %payment.id, "failed to publish partial_payment.processed");
        }
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDisputeStore;
    use smartcheques_core::RecordingPublisher;
    use smartcheques_ledger::{AssetClass, InMemoryLedgerStore};

    async fn engine() -> (DisputeEngine, EnterpriseId, CurrencyCode) {
        let ledger = Arc::new(LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()), Arc::new(RecordingPublisher::new())));
        ledger.register_asset("usdt", AssetClass::Stablecoin, 6, Money::parse("1").unwrap(), None, 0.0).await.unwrap();
        let enterprise = EnterpriseId::new();
        let usdt = CurrencyCode::new("USDT").unwrap();
        ledger.initialize(enterprise, &usdt).await.unwrap();
        let engine = DisputeEngine::new(Arc::new(InMemoryDisputeStore::new()), ledger, Arc::new(RecordingPublisher::new()));
        (engine, enterprise, usdt)
    }

    #[tokio::test]
    async fn refund_blocked_until_dispute_resolved() {
        let (engine, enterprise, usdt) = engine().await;
        let dispute = engine
            .initiate(enterprise, SmartChequeId::new(), "title".into(), "fraud".into(), Priority::High, None)
            .await
            .unwrap();

        let result = engine
            .create_refund(dispute.id, Money::parse("500").unwrap(), Money::parse("100").unwrap(), "r".into(), RefundType::Full, "user".into())
            .await;
        assert!(matches!(result, Err(DisputeError::NotRefundable(_))));

        engine.resolve(&dispute.id).await.unwrap();
        let refund = engine
            .create_refund(dispute.id, Money::parse("500").unwrap(), Money::parse("100").unwrap(), "r".into(), RefundType::Full, "user".into())
            .await
            .unwrap();
        assert_eq!(refund.status, RecordStatus::Pending);
        let _ = usdt;
    }

    #[tokio::test]
    async fn execute_refund_credits_available_balance() {
        let (engine, enterprise, usdt) = engine().await;
        let dispute = engine
            .initiate(enterprise, SmartChequeId::new(), "title".into(), "fraud".into(), Priority::High, None)
            .await
            .unwrap();
        engine.resolve(&dispute.id).await.unwrap();
        let refund = engine
            .create_refund(dispute.id, Money::parse("500").unwrap(), Money::parse("100").unwrap(), "r".into(), RefundType::Full, "user".into())
            .await
            .unwrap();
        engine.approve_refund(&refund.id).await.unwrap();
        let executed = engine.execute_refund(&refund.id, enterprise, usdt.clone()).await.unwrap();
        assert_eq!(executed.status, RecordStatus::Completed);

        let balance = engine.ledger.get(&enterprise, &usdt).await.unwrap();
        assert_eq!(balance.available.to_string(), "100");
    }
}
