use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alerts;
use super::domain::{
    Alert, AiModelInfo, OptimizationMetrics, PlanStatus, RankedTrain, SimulationParams, Train,
    TrainOverlay,
};
use super::optimizer;
use super::scoring::PlanningConstraints;

/// How the hypothetical modification moved the target train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub new_rank: Option<u32>,
    pub rank_change: String,
    pub affected_trains: usize,
}

/// Transient plan shape returned by a what-if run. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub status: PlanStatus,
    pub ranked_trains: Vec<RankedTrain>,
    pub alerts: Vec<Alert>,
    #[serde(rename = "optimizationMetrics")]
    pub metrics: OptimizationMetrics,
    #[serde(rename = "aiModelInfo")]
    pub model_info: AiModelInfo,
    pub simulation_params: SimulationParams,
    pub impact_analysis: ImpactAnalysis,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("train {0} not found")]
    TrainNotFound(String),
}

/// Apply a hypothetical modification to one train and rerun the ranking over
/// the modified fleet, reporting where the target lands.
pub fn simulate(
    trains: &[Train],
    target: &str,
    modifications: &TrainOverlay,
    planning_constraints: &PlanningConstraints,
    now: DateTime<Utc>,
) -> Result<SimulationOutcome, SimulationError> {
    let target_train = trains
        .iter()
        .find(|train| train.code == target || train.id.0 == target)
        .ok_or_else(|| SimulationError::TrainNotFound(target.to_string()))?;
    let target_id = target_train.id.clone();

    let modified_fleet: Vec<Train> = trains
        .iter()
        .map(|train| {
            if train.id == target_id {
                modifications.apply_to(train)
            } else {
                train.clone()
            }
        })
        .collect();

    let outcome = optimizer::optimize(&modified_fleet, planning_constraints, now);
    let alerts = alerts::generate_alerts(&modified_fleet, now);

    let new_rank = outcome
        .ranked_trains
        .iter()
        .find(|entry| entry.train_id == target_id)
        .map(|entry| entry.rank);
    let rank_change = match new_rank {
        Some(rank) => format!("Moved to rank {rank}"),
        None => "Not in top rankings".to_string(),
    };

    Ok(SimulationOutcome {
        status: PlanStatus::Simulation,
        impact_analysis: ImpactAnalysis {
            new_rank,
            rank_change,
            affected_trains: outcome.ranked_trains.len(),
        },
        ranked_trains: outcome.ranked_trains,
        alerts,
        metrics: outcome.metrics,
        model_info: outcome.model_info,
        simulation_params: SimulationParams {
            target_train: target.to_string(),
            modifications: modifications.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::induction::domain::{
        Branding, BrandingOverlay, CleaningStatus, FitnessCertificate, FitnessOverlay,
        MaintenanceStatus, TrainId,
    };
    use chrono::Duration;

    fn fleet_member(code: &str, mileage: u64, branding_priority: Option<u8>) -> Train {
        let now = Utc::now();
        Train {
            id: TrainId(format!("train-{code}")),
            code: code.to_string(),
            fitness: FitnessCertificate {
                valid: true,
                expiry: now + Duration::days(60),
                last_inspection: None,
            },
            maintenance_status: MaintenanceStatus::Operational,
            last_maintenance: None,
            next_maintenance_due: Some(now + Duration::days(30)),
            cleaning_status: CleaningStatus::Clean,
            current_mileage: mileage,
            current_location: "Aluva".to_string(),
            available_for_service: true,
            total_operational_hours: 1500,
            branding: match branding_priority {
                Some(priority) => Branding {
                    has_branding: true,
                    campaign: "Metro Life".to_string(),
                    priority,
                },
                None => Branding::none(),
            },
            performance_score: None,
            reliability_score: None,
        }
    }

    fn fleet() -> Vec<Train> {
        vec![
            fleet_member("TS-01", 5000, Some(3)),
            fleet_member("TS-02", 5200, None),
            fleet_member("TS-03", 4800, Some(5)),
        ]
    }

    #[test]
    fn branding_boost_promotes_target_through_tie_break() {
        let modifications = TrainOverlay {
            branding: Some(BrandingOverlay {
                has_branding: Some(true),
                priority: Some(5),
                ..BrandingOverlay::default()
            }),
            ..TrainOverlay::default()
        };

        let outcome = simulate(
            &fleet(),
            "TS-02",
            &modifications,
            &PlanningConstraints::default(),
            Utc::now(),
        )
        .expect("target exists");

        // TS-02 and TS-03 now tie; the code tie-break puts TS-02 first
        assert_eq!(outcome.impact_analysis.new_rank, Some(1));
        assert_eq!(outcome.impact_analysis.rank_change, "Moved to rank 1");
        assert_eq!(outcome.impact_analysis.affected_trains, 3);
        assert_eq!(outcome.ranked_trains[0].train_code, "TS-02");
        assert_eq!(outcome.status, PlanStatus::Simulation);
    }

    #[test]
    fn invalidating_fitness_drops_target_from_ranking() {
        let modifications = TrainOverlay {
            fitness: Some(FitnessOverlay {
                valid: Some(false),
                ..FitnessOverlay::default()
            }),
            ..TrainOverlay::default()
        };

        let outcome = simulate(
            &fleet(),
            "TS-01",
            &modifications,
            &PlanningConstraints::default(),
            Utc::now(),
        )
        .expect("target exists");

        assert_eq!(outcome.impact_analysis.new_rank, None);
        assert_eq!(outcome.impact_analysis.rank_change, "Not in top rankings");
        assert_eq!(outcome.ranked_trains.len(), 2);
    }

    #[test]
    fn target_resolves_by_opaque_id_too() {
        let outcome = simulate(
            &fleet(),
            "train-TS-03",
            &TrainOverlay::default(),
            &PlanningConstraints::default(),
            Utc::now(),
        )
        .expect("target exists");
        assert_eq!(outcome.simulation_params.target_train, "train-TS-03");
    }

    #[test]
    fn unknown_target_is_an_error() {
        let result = simulate(
            &fleet(),
            "TS-99",
            &TrainOverlay::default(),
            &PlanningConstraints::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(SimulationError::TrainNotFound(code)) if code == "TS-99"));
    }

    #[test]
    fn alerts_reflect_the_modified_fleet() {
        let modifications = TrainOverlay {
            available_for_service: Some(false),
            ..TrainOverlay::default()
        };

        let outcome = simulate(
            &fleet(),
            "TS-01",
            &modifications,
            &PlanningConstraints::default(),
            Utc::now(),
        )
        .expect("target exists");

        assert!(outcome
            .alerts
            .iter()
            .any(|alert| alert.message == "TS-01 is not available for service"));
    }
}
