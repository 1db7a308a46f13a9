use std::collections::{HashMap, HashSet, VecDeque};

use smartcheques_core::MilestoneId;

use crate::error::MilestoneError;
use crate::milestone::Milestone;

/// Validates that every dependency named by `milestones` exists among them,
/// then confirms the resulting adjacency is acyclic via Kahn's algorithm. A
/// sort that cannot consume every node identifies a residual cycle.
///
/// Mirrors the teacher's vertex validator: parent (here, dependency)
/// existence is checked first, then the structural property, before any
/// edge is considered accepted.
pub fn validate_graph(milestones: &[Milestone]) -> Result<Vec<MilestoneId>, MilestoneError> {
    let known: HashSet<MilestoneId> = milestones.iter().map(|m| m.id).collect();
    for m in milestones {
        for dep in &m.dependencies {
            if !known.contains(dep) {
                return Err(MilestoneError::UnknownDependency(dep.to_string()));
            }
        }
    }
    topological_order(milestones)
}

/// `map[milestoneID] -> dependencyIDs`, the public resolve-graph contract.
pub fn resolve_graph(milestones: &[Milestone]) -> HashMap<MilestoneId, Vec<MilestoneId>> {
    milestones.iter().map(|m| (m.id, m.dependencies.clone())).collect()
}

fn topological_order(milestones: &[Milestone]) -> Result<Vec<MilestoneId>, MilestoneError> {
    let mut in_degree: HashMap<MilestoneId, usize> = milestones.iter().map(|m| (m.id, 0)).collect();
    let mut dependents: HashMap<MilestoneId, Vec<MilestoneId>> = HashMap::new();

    for m in milestones {
        for dep in &m.dependencies {
            *in_degree.get_mut(&m.id).unwrap() += 1;
            dependents.entry(*dep).or_default().push(m.id);
        }
    }

    let mut queue: VecDeque<MilestoneId> =
        in_degree.iter().filter(|(_, deg)| **deg == 0).map(|(id, _)| *id).collect();
    let mut order = Vec::with_capacity(milestones.len());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(children) = dependents.get(&id) {
            for child in children {
                let degree = in_degree.get_mut(child).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*child);
                }
            }
        }
    }

    if order.len() != milestones.len() {
        return Err(MilestoneError::CyclicDependency);
    }
    Ok(order)
}

/// The longest path through the dependency graph weighted by estimated
/// duration, i.e. the sequence of milestones dominating the schedule.
pub fn critical_path(milestones: &[Milestone]) -> Result<Vec<MilestoneId>, MilestoneError> {
    let order = topological_order(milestones)?;
    let by_id: HashMap<MilestoneId, &Milestone> = milestones.iter().map(|m| (m.id, m)).collect();

    let mut longest: HashMap<MilestoneId, (i64, Option<MilestoneId>)> = HashMap::new();
    for id in &order {
        let m = by_id[id];
        let duration = m.estimated_duration_secs.unwrap_or(0);
        let mut best = (duration, None);
        for dep in &m.dependencies {
            if let Some((dep_len, _)) = longest.get(dep) {
                let candidate = dep_len + duration;
                if candidate > best.0 {
                    best = (candidate, Some(*dep));
                }
            }
        }
        longest.insert(*id, best);
    }

    let tail = longest.iter().max_by_key(|(_, (len, _))| *len).map(|(id, _)| *id);
    let mut path = Vec::new();
    let mut cursor = tail;
    while let Some(id) = cursor {
        path.push(id);
        cursor = longest.get(&id).and_then(|(_, prev)| *prev);
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::{Priority, RiskLevel};
    use smartcheques_core::ContractId;

    fn milestone(contract: ContractId, deps: Vec<MilestoneId>) -> Milestone {
        Milestone::new(
            contract,
            0,
            "m".into(),
            "trigger".into(),
            "criteria".into(),
            deps,
            Priority::Medium,
            "general".into(),
            RiskLevel::Low,
            chrono::Utc::now(),
        )
    }

    #[test]
    fn acyclic_graph_validates() {
        let contract = ContractId::new();
        let m1 = milestone(contract, vec![]);
        let m2 = milestone(contract, vec![m1.id]);
        let order = validate_graph(&[m1.clone(), m2.clone()]).unwrap();
        assert_eq!(order, vec![m1.id, m2.id]);
    }

    #[test]
    fn cycle_is_rejected() {
        let contract = ContractId::new();
        let mut m1 = milestone(contract, vec![]);
        let mut m2 = milestone(contract, vec![m1.id]);
        m1.dependencies.push(m2.id);
        let result = validate_graph(&[m1, m2]);
        assert!(matches!(result, Err(MilestoneError::CyclicDependency)));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let contract = ContractId::new();
        let m1 = milestone(contract, vec![MilestoneId::new()]);
        let result = validate_graph(&[m1]);
        assert!(matches!(result, Err(MilestoneError::UnknownDependency(_))));
    }
}
