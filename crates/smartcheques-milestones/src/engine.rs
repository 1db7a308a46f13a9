use std::sync::Arc;

use chrono::Utc;
use smartcheques_core::event::event_type;
use smartcheques_core::{ContractId, Event, EventPublisher, MilestoneId, Timestamp};
use tracing::warn;

use crate::error::MilestoneError;
use crate::graph::{critical_path, resolve_graph, validate_graph};
use crate::milestone::{Milestone, MilestoneStatus};
use crate::store::MilestoneStore;

/// Aggregate stats for a contract's milestones.
#[derive(Debug, Clone, Default)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub overdue: usize,
}

pub struct MilestoneEngine {
    store: Arc<dyn MilestoneStore>,
    events: Arc<dyn EventPublisher>,
}

impl MilestoneEngine {
    pub fn new(store: Arc<dyn MilestoneStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn create(&self, milestone: Milestone) -> Result<Milestone, MilestoneError> {
        let mut siblings = self.store.list_by_contract(&milestone.contract_id).await?;
        siblings.push(milestone.clone());
        validate_graph(&siblings)?;
        self.store.put(milestone.clone()).await?;
        Ok(milestone)
    }

    pub async fn get(&self, id: &MilestoneId) -> Result<Milestone, MilestoneError> {
        self.store.get(id).await?.ok_or_else(|| MilestoneError::NotFound(id.to_string()))
    }

    pub async fn add_dependency(&self, id: &MilestoneId, dependency: MilestoneId) -> Result<Milestone, MilestoneError> {
        let mut milestone = self.get(id).await?;
        let mut siblings = self.store.list_by_contract(&milestone.contract_id).await?;
        milestone.dependencies.push(dependency);
        siblings.retain(|m| m.id != milestone.id);
        siblings.push(milestone.clone());
        // validate_graph rejects the edge without mutating the stored graph
        // on failure, since we only persist after this call succeeds.
        validate_graph(&siblings)?;
        milestone.updated_at = Utc::now();
        self.store.put(milestone.clone()).await?;
        Ok(milestone)
    }

    pub async fn resolve_graph(&self, contract_id: &ContractId) -> Result<std::collections::HashMap<MilestoneId, Vec<MilestoneId>>, MilestoneError> {
        Ok(resolve_graph(&self.store.list_by_contract(contract_id).await?))
    }

    pub async fn critical_path(&self, contract_id: &ContractId) -> Result<Vec<MilestoneId>, MilestoneError> {
        critical_path(&self.store.list_by_contract(contract_id).await?)
    }

    /// `pending -> in_progress`. Requires every dependency to be `completed`.
    pub async fn start(&self, id: &MilestoneId) -> Result<Milestone, MilestoneError> {
        let mut milestone = self.get(id).await?;
        if milestone.status != MilestoneStatus::Pending {
            return Err(MilestoneError::InvalidTransition {
                from: format!("{:?}", milestone.status),
                to: "in_progress".into(),
            });
        }
        for dep in &milestone.dependencies {
            let dependency = self.get(dep).await?;
            if dependency.status != MilestoneStatus::Completed {
                return Err(MilestoneError::DependencyNotMet(dep.to_string()));
            }
        }
        milestone.status = MilestoneStatus::InProgress;
        milestone.actual_start = Some(Utc::now());
        milestone.updated_at = Utc::now();
        self.store.put(milestone.clone()).await?;
        Ok(milestone)
    }

    /// `in_progress -> verified`. Verification evidence acceptance (manual
    /// or oracle-backed) is the caller's responsibility; this only performs
    /// the state transition once the caller has already decided to accept.
    pub async fn verify(&self, id: &MilestoneId) -> Result<Milestone, MilestoneError> {
        let mut milestone = self.get(id).await?;
        if milestone.status != MilestoneStatus::InProgress {
            return Err(MilestoneError::InvalidTransition {
                from: format!("{:?}", milestone.status),
                to: "verified".into(),
            });
        }
        milestone.status = MilestoneStatus::Verified;
        milestone.updated_at = Utc::now();
        self.store.put(milestone.clone()).await?;
        Ok(milestone)
    }

    /// `verified -> completed`. Sets `percentage_complete = 100` and
    /// `actual_end = now`.
    pub async fn complete(&self, id: &MilestoneId) -> Result<Milestone, MilestoneError> {
        let mut milestone = self.get(id).await?;
        if milestone.status != MilestoneStatus::Verified {
            return Err(MilestoneError::InvalidTransition {
                from: format!("{:?}", milestone.status),
                to: "completed".into(),
            });
        }
        let now = Utc::now();
        milestone.status = MilestoneStatus::Completed;
        milestone.percentage_complete = 100.0;
        milestone.actual_end = Some(now);
        if let Some(start) = milestone.actual_start {
            milestone.actual_duration_secs = Some((now - start).num_seconds());
        }
        milestone.updated_at = now;
        self.store.put(milestone.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::MILESTONE_COMPLETED, "milestones").with("milestone_id", milestone.id.to_string()))
            .await
        {
            warn!(milestone = %milestone.id, "failed to publish milestone.completed");
        }
        Ok(milestone)
    }

    /// Any non-`completed` state may transition to `failed`. Progress is
    /// left untouched; the caller is responsible for marking the bound
    /// smart cheque `disputed`.
    pub async fn fail(&self, id: &MilestoneId) -> Result<Milestone, MilestoneError> {
        let mut milestone = self.get(id).await?;
        if milestone.status == MilestoneStatus::Completed {
            return Err(MilestoneError::InvalidTransition {
                from: format!("{:?}", milestone.status),
                to: "failed".into(),
            });
        }
        milestone.status = MilestoneStatus::Failed;
        milestone.updated_at = Utc::now();
        self.store.put(milestone.clone()).await?;

        if !self
            .events
            .publish(Event::new(event_type::MILESTONE_FAILED, "milestones").with("milestone_id", milestone.id.to_string()))
            .await
        {
            warn!(milestone = %milestone.id, "failed to publish milestone.failed");
        }
        Ok(milestone)
    }

    pub async fn update_progress(&self, id: &MilestoneId, percentage: f64) -> Result<Milestone, MilestoneError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(MilestoneError::InvalidProgress(percentage));
        }
        let mut milestone = self.get(id).await?;
        milestone.percentage_complete = percentage;
        milestone.updated_at = Utc::now();
        self.store.put(milestone.clone()).await?;

        if !self
            .events
            .publish(
                Event::new(event_type::MILESTONE_PROGRESS, "milestones")
                    .with("milestone_id", milestone.id.to_string())
                    .with("percentage_complete", percentage),
            )
            .await
        {
            warn!(milestone = %milestone.id, "failed to publish milestone.progress");
        }
        Ok(milestone)
    }

    pub async fn list_overdue(&self, contract_id: &ContractId, now: Timestamp) -> Result<Vec<Milestone>, MilestoneError> {
        Ok(self
            .store
            .list_by_contract(contract_id)
            .await?
            .into_iter()
            .filter(|m| m.is_overdue(now))
            .collect())
    }

    pub async fn completion_stats(&self, contract_id: &ContractId) -> Result<CompletionStats, MilestoneError> {
        let milestones = self.store.list_by_contract(contract_id).await?;
        let now = Utc::now();
        let mut stats = CompletionStats { total: milestones.len(), ..Default::default() };
        for m in &milestones {
            match m.status {
                MilestoneStatus::Completed => stats.completed += 1,
                MilestoneStatus::Failed => stats.failed += 1,
                _ => {}
            }
            if m.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::{Priority, RiskLevel};
    use crate::store::InMemoryMilestoneStore;
    use smartcheques_core::RecordingPublisher;

    fn engine() -> MilestoneEngine {
        MilestoneEngine::new(Arc::new(InMemoryMilestoneStore::new()), Arc::new(RecordingPublisher::new()))
    }

    fn new_milestone(contract: ContractId, deps: Vec<MilestoneId>) -> Milestone {
        Milestone::new(
            contract,
            0,
            "deliver widget".into(),
            "signed receipt".into(),
            "manual sign-off".into(),
            deps,
            Priority::Medium,
            "delivery".into(),
            RiskLevel::Low,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn start_requires_dependencies_completed() {
        let engine = engine();
        let contract = ContractId::new();
        let dep = engine.create(new_milestone(contract, vec![])).await.unwrap();
        let milestone = engine.create(new_milestone(contract, vec![dep.id])).await.unwrap();

        let result = engine.start(&milestone.id).await;
        assert!(matches!(result, Err(MilestoneError::DependencyNotMet(_))));

        engine.start(&dep.id).await.unwrap();
        engine.verify(&dep.id).await.unwrap();
        engine.complete(&dep.id).await.unwrap();

        let started = engine.start(&milestone.id).await.unwrap();
        assert_eq!(started.status, MilestoneStatus::InProgress);
    }

    #[tokio::test]
    async fn complete_requires_verified_state() {
        let engine = engine();
        let contract = ContractId::new();
        let milestone = engine.create(new_milestone(contract, vec![])).await.unwrap();

        let result = engine.complete(&milestone.id).await;
        assert!(matches!(result, Err(MilestoneError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn completing_sets_full_progress_and_end_time() {
        let engine = engine();
        let contract = ContractId::new();
        let milestone = engine.create(new_milestone(contract, vec![])).await.unwrap();
        engine.start(&milestone.id).await.unwrap();
        engine.verify(&milestone.id).await.unwrap();
        let completed = engine.complete(&milestone.id).await.unwrap();
        assert_eq!(completed.percentage_complete, 100.0);
        assert!(completed.actual_end.is_some());
    }

    #[tokio::test]
    async fn progress_outside_range_is_rejected() {
        let engine = engine();
        let contract = ContractId::new();
        let milestone = engine.create(new_milestone(contract, vec![])).await.unwrap();
        let result = engine.update_progress(&milestone.id, 150.0).await;
        assert!(matches!(result, Err(MilestoneError::InvalidProgress(_))));
    }
}
