use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smartcheques_core::constants::{
    COMPLEXITY_BONUS_ARBITRATION, COMPLEXITY_BONUS_COURT, COMPLEXITY_BONUS_MEDIATION, COMPLEXITY_HIGH_THRESHOLD,
    COST_PENALTY_WEIGHT, DISPUTE_LOW_AMOUNT_THRESHOLD, FRAUD_INFORMAL_PENALTY, GENERIC_CANDIDATE_BASELINE,
    HIGH_EVIDENCE_THRESHOLD, HISTORY_CYCLE_TIME_NORMALIZER_DAYS, HISTORY_CYCLE_TIME_WEIGHT, HISTORY_SUCCESS_WEIGHT,
    JURISDICTION_ADR_BONUS, JURISDICTION_COURT_PENALTY, LOW_AMOUNT_MUTUAL_CONFIDENCE, MULTI_PARTY_BONUS,
    MULTI_PARTY_THRESHOLD, TIME_PENALTY_WEIGHT,
};
use smartcheques_core::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    MutualAgreement,
    Mediation,
    Arbitration,
    Court,
    Administrative,
}

impl ResolutionMethod {
    const ALL: [ResolutionMethod; 5] = [
        ResolutionMethod::MutualAgreement,
        ResolutionMethod::Mediation,
        ResolutionMethod::Arbitration,
        ResolutionMethod::Court,
        ResolutionMethod::Administrative,
    ];

    /// Fixed `(cost, time)` cost-coefficients per method, each in `[0, 1]`.
    fn cost_time(&self) -> (f64, f64) {
        match self {
            ResolutionMethod::MutualAgreement => (0.10, 0.10),
            ResolutionMethod::Mediation => (0.30, 0.30),
            ResolutionMethod::Arbitration => (0.60, 0.60),
            ResolutionMethod::Court => (0.90, 0.90),
            ResolutionMethod::Administrative => (0.40, 0.50),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HistoricalPerformance {
    pub success_rate: f64,
    pub avg_cycle_days: f64,
}

/// Signals consulted by the scoring pipeline. `historical` is keyed by
/// method; a method with no entry gets no historical adjustment.
#[derive(Clone, Debug)]
pub struct DisputeRoutingInput {
    pub category: String,
    pub confidence: f64,
    pub amount: Money,
    pub complexity: f64,
    pub party_count: u32,
    pub evidence_count: usize,
    pub jurisdiction: String,
    pub historical: HashMap<ResolutionMethod, HistoricalPerformance>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub method: ResolutionMethod,
    pub score: f64,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct RoutingDecision {
    pub chosen: Candidate,
    pub alternatives: Vec<Candidate>,
}

fn seed_candidates(input: &DisputeRoutingInput) -> HashMap<ResolutionMethod, (f64, Vec<String>)> {
    let mut seeded: HashMap<ResolutionMethod, (f64, Vec<String>)> = ResolutionMethod::ALL
        .iter()
        .map(|m| (*m, (GENERIC_CANDIDATE_BASELINE, vec!["generic baseline".to_string()])))
        .collect();

    if input.category == "fraud" {
        let score = 0.5 + 0.5 * input.confidence;
        seeded.insert(ResolutionMethod::Court, (score, vec![format!("fraud categorization, confidence {}", input.confidence)]));
    }

    let low_amount_threshold = Money::parse(DISPUTE_LOW_AMOUNT_THRESHOLD).unwrap();
    if input.amount < low_amount_threshold {
        let score = 0.5 + 0.5 * LOW_AMOUNT_MUTUAL_CONFIDENCE;
        seeded.insert(ResolutionMethod::MutualAgreement, (score, vec!["low disputed amount favors mutual agreement".to_string()]));
    }

    seeded
}

/// Scores every candidate method and returns the argmax with the rest as
/// ranked alternatives. Ties are broken by `ResolutionMethod::ALL` order.
pub fn route(input: &DisputeRoutingInput) -> RoutingDecision {
    let seeded = seed_candidates(input);
    let mut candidates: Vec<Candidate> = ResolutionMethod::ALL
        .iter()
        .map(|method| {
            let (mut score, mut reasons) = seeded.get(method).cloned().unwrap_or_default();

            if input.complexity > COMPLEXITY_HIGH_THRESHOLD {
                let bonus = match method {
                    ResolutionMethod::Arbitration => COMPLEXITY_BONUS_ARBITRATION,
                    ResolutionMethod::Mediation => COMPLEXITY_BONUS_MEDIATION,
                    ResolutionMethod::Court => COMPLEXITY_BONUS_COURT,
                    _ => 0.0,
                };
                if bonus != 0.0 {
                    score += bonus;
                    reasons.push(format!("high complexity +{bonus}"));
                }
            }

            if input.party_count > MULTI_PARTY_THRESHOLD || input.evidence_count >= HIGH_EVIDENCE_THRESHOLD {
                if matches!(method, ResolutionMethod::Mediation | ResolutionMethod::Arbitration) {
                    score += MULTI_PARTY_BONUS;
                    reasons.push(format!("multi-party/high-evidence +{MULTI_PARTY_BONUS}"));
                }
            }

            if matches!(input.jurisdiction.as_str(), "EU" | "IN") {
                match method {
                    ResolutionMethod::Court => {
                        score -= JURISDICTION_COURT_PENALTY;
                        reasons.push(format!("jurisdiction {} court penalty", input.jurisdiction));
                    }
                    ResolutionMethod::Mediation | ResolutionMethod::Arbitration => {
                        score += JURISDICTION_ADR_BONUS;
                        reasons.push(format!("jurisdiction {} ADR bonus", input.jurisdiction));
                    }
                    _ => {}
                }
            }

            if let Some(history) = input.historical.get(method) {
                let adjustment = HISTORY_SUCCESS_WEIGHT * (history.success_rate - 0.5)
                    - HISTORY_CYCLE_TIME_WEIGHT * (history.avg_cycle_days / HISTORY_CYCLE_TIME_NORMALIZER_DAYS);
                score += adjustment;
                reasons.push(format!("historical performance {adjustment:+.4}"));
            }

            if input.category == "fraud" && matches!(method, ResolutionMethod::MutualAgreement | ResolutionMethod::Administrative) {
                score -= FRAUD_INFORMAL_PENALTY;
                reasons.push(format!("fraud categorization disfavors informal resolution -{FRAUD_INFORMAL_PENALTY}"));
            }

            let (cost, time) = method.cost_time();
            let penalty = COST_PENALTY_WEIGHT * cost + TIME_PENALTY_WEIGHT * time;
            score -= penalty;
            reasons.push(format!("cost/time penalty -{penalty:.4}"));

            Candidate { method: *method, score, reason: reasons.join("; ") }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap()
            .then_with(|| ResolutionMethod::ALL.iter().position(|m| *m == a.method).cmp(&ResolutionMethod::ALL.iter().position(|m| *m == b.method)))
    });

    let chosen = candidates.remove(0);
    RoutingDecision { chosen, alternatives: candidates }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> DisputeRoutingInput {
        DisputeRoutingInput {
            category: "fraud".into(),
            confidence: 0.8,
            amount: Money::parse("200").unwrap(),
            complexity: 0.0,
            party_count: 1,
            evidence_count: 0,
            jurisdiction: "US".into(),
            historical: HashMap::new(),
        }
    }

    #[test]
    fn fraud_category_under_low_amount_routes_to_court() {
        let decision = route(&base_input());
        assert_eq!(decision.chosen.method, ResolutionMethod::Court);
        assert!((decision.chosen.score - 0.738).abs() < 0.01);
        assert!(decision.alternatives.iter().any(|c| c.method == ResolutionMethod::MutualAgreement));
    }

    #[test]
    fn high_complexity_favors_arbitration_bonus() {
        let mut input = base_input();
        input.category = "other".into();
        input.complexity = 0.9;
        let decision = route(&input);
        let arb = decision
            .alternatives
            .iter()
            .chain(std::iter::once(&decision.chosen))
            .find(|c| c.method == ResolutionMethod::Arbitration)
            .unwrap();
        assert!(arb.score > GENERIC_CANDIDATE_BASELINE - 0.5);
    }

    #[test]
    fn equal_baseline_is_won_by_lowest_cost_time_penalty() {
        let input = DisputeRoutingInput {
            category: "other".into(),
            confidence: 0.0,
            amount: Money::parse("5000").unwrap(),
            complexity: 0.0,
            party_count: 1,
            evidence_count: 0,
            jurisdiction: "US".into(),
            historical: HashMap::new(),
        };
        let decision = route(&input);
        assert_eq!(decision.chosen.method, ResolutionMethod::MutualAgreement);
    }
}
