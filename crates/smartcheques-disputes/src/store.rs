use std::collections::HashMap;

use async_trait::async_trait;
use smartcheques_core::{DisputeId, PartialPaymentId, RefundId};
use tokio::sync::RwLock;

use crate::dispute::Dispute;
use crate::error::DisputeError;
use crate::refund::{PartialPayment, Refund};

#[async_trait]
pub trait DisputeStore: Send + Sync {
    async fn get_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, DisputeError>;
    async fn put_dispute(&self, dispute: Dispute) -> Result<(), DisputeError>;

    async fn get_refund(&self, id: &RefundId) -> Result<Option<Refund>, DisputeError>;
    async fn put_refund(&self, refund: Refund) -> Result<(), DisputeError>;

    async fn get_partial_payment(&self, id: &PartialPaymentId) -> Result<Option<PartialPayment>, DisputeError>;
    async fn put_partial_payment(&self, payment: PartialPayment) -> Result<(), DisputeError>;
}

#[derive(Default)]
pub struct InMemoryDisputeStore {
    disputes: RwLock<HashMap<DisputeId, Dispute>>,
    refunds: RwLock<HashMap<RefundId, Refund>>,
    partial_payments: RwLock<HashMap<PartialPaymentId, PartialPayment>>,
}

impl InMemoryDisputeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DisputeStore for InMemoryDisputeStore {
    async fn get_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, DisputeError> {
        Ok(self.disputes.read().await.get(id).cloned())
    }

    async fn put_dispute(&self, dispute: Dispute) -> Result<(), DisputeError> {
        self.disputes.write().await.insert(dispute.id, dispute);
        Ok(())
    }

    async fn get_refund(&self, id: &RefundId) -> Result<Option<Refund>, DisputeError> {
        Ok(self.refunds.read().await.get(id).cloned())
    }

    async fn put_refund(&self, refund: Refund) -> Result<(), DisputeError> {
        self.refunds.write().await.insert(refund.id, refund);
        Ok(())
    }

    async fn get_partial_payment(&self, id: &PartialPaymentId) -> Result<Option<PartialPayment>, DisputeError> {
        Ok(self.partial_payments.read().await.get(id).cloned())
    }

    async fn put_partial_payment(&self, payment: PartialPayment) -> Result<(), DisputeError> {
        self.partial_payments.write().await.insert(payment.id, payment);
        Ok(())
    }
}
