use std::collections::HashMap;

use async_trait::async_trait;
use smartcheques_core::{ContractId, MilestoneId};
use tokio::sync::RwLock;

use crate::error::MilestoneError;
use crate::milestone::Milestone;

#[async_trait]
pub trait MilestoneStore: Send + Sync {
    async fn get(&self, id: &MilestoneId) -> Result<Option<Milestone>, MilestoneError>;
    async fn put(&self, milestone: Milestone) -> Result<(), MilestoneError>;
    async fn list_by_contract(&self, contract_id: &ContractId) -> Result<Vec<Milestone>, MilestoneError>;
}

#[derive(Default)]
pub struct InMemoryMilestoneStore {
    milestones: RwLock<HashMap<MilestoneId, Milestone>>,
}

impl InMemoryMilestoneStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MilestoneStore for InMemoryMilestoneStore {
    async fn get(&self, id: &MilestoneId) -> Result<Option<Milestone>, MilestoneError> {
        Ok(self.milestones.read().await.get(id).cloned())
    }

    async fn put(&self, milestone: Milestone) -> Result<(), MilestoneError> {
        self.milestones.write().await.insert(milestone.id, milestone);
        Ok(())
    }

    async fn list_by_contract(&self, contract_id: &ContractId) -> Result<Vec<Milestone>, MilestoneError> {
        Ok(self
            .milestones
            .read()
            .await
            .values()
            .filter(|m| &m.contract_id == contract_id)
            .cloned()
            .collect())
    }
}
