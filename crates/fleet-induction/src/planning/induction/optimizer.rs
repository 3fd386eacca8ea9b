use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constraints;
use super::domain::{AiModelInfo, OptimizationMetrics, RankedTrain, Train};
use super::scoring::{self, FleetContext, PlanningConstraints};

pub const FALLBACK_VERSION: &str = "1.0-fallback";
pub const FALLBACK_ALGORITHM: &str = "Rule-Based Weighted Scoring";

/// Ranking produced by one optimization pass, local or external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub ranked_trains: Vec<RankedTrain>,
    pub metrics: OptimizationMetrics,
    pub model_info: AiModelInfo,
}

/// Rule-based induction ranking.
///
/// Hard-ineligible trains are dropped before scoring; the survivors are
/// ordered by `(score DESC, code ASC)` so ties always resolve the same way,
/// then assigned dense 1-based ranks. Degenerate inputs produce an empty
/// ranking rather than an error.
pub fn optimize(
    trains: &[Train],
    planning_constraints: &PlanningConstraints,
    now: DateTime<Utc>,
) -> OptimizationOutcome {
    let started = Instant::now();

    let candidates: Vec<(&Train, constraints::EvaluatedConstraints)> = trains
        .iter()
        .map(|train| (train, constraints::evaluate(train, now)))
        .filter(|(_, evaluated)| evaluated.hard_eligible)
        .collect();

    let mean_mileage = if candidates.is_empty() {
        0.0
    } else {
        candidates
            .iter()
            .map(|(train, _)| train.current_mileage as f64)
            .sum::<f64>()
            / candidates.len() as f64
    };
    let context = FleetContext { mean_mileage, now };

    let mut scored: Vec<(&Train, scoring::TrainScore)> = candidates
        .into_iter()
        .map(|(train, evaluated)| {
            let score = scoring::score(train, &evaluated, &context);
            (train, score)
        })
        .collect();
    scored.sort_by(|(left, left_score), (right, right_score)| {
        right_score
            .score
            .total_cmp(&left_score.score)
            .then_with(|| left.code.cmp(&right.code))
    });

    let ranked_trains: Vec<RankedTrain> = scored
        .into_iter()
        .enumerate()
        .map(|(index, (train, score))| RankedTrain {
            train_id: train.id.clone(),
            train_code: train.code.clone(),
            rank: index as u32 + 1,
            reasoning: score.reasoning,
            confidence_score: score.confidence_score,
            constraints: score.constraints,
        })
        .collect();

    let average_confidence = if ranked_trains.is_empty() {
        0.0
    } else {
        ranked_trains
            .iter()
            .map(|entry| f64::from(entry.confidence_score))
            .sum::<f64>()
            / ranked_trains.len() as f64
    };

    let metrics = OptimizationMetrics {
        total_trains_evaluated: trains.len(),
        constraints_satisfied: ranked_trains.len(),
        average_confidence,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };

    OptimizationOutcome {
        ranked_trains,
        metrics,
        model_info: AiModelInfo {
            version: FALLBACK_VERSION.to_string(),
            algorithm: FALLBACK_ALGORITHM.to_string(),
            parameters: planning_constraints.as_value(),
        },
    }
}
