use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::alerts;
use super::auth::CallerIdentity;
use super::constraints;
use super::domain::{
    Alert, AlertKind, Branding, ConstraintReport, FitnessCertificate, InductionPlan,
    MaintenanceUrgency, PlanId, PlanStatus, RankedTrain, Train, TrainOverlay,
};
use super::external::{ExternalOptimizer, ExternalOptimizerError};
use super::optimizer::{self, OptimizationOutcome};
use super::repository::{PlanRepository, RepositoryError, TrainRepository};
use super::scoring::PlanningConstraints;
use super::simulation::{self, SimulationError, SimulationOutcome};

/// Facade composing the repositories, the external optimizer adapter, and the
/// local planning components behind the five plan operations.
pub struct InductionPlanService<T, P, X> {
    trains: Arc<T>,
    plans: Arc<P>,
    external: Arc<X>,
}

static PLAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_plan_id() -> PlanId {
    let id = PLAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PlanId(format!("plan-{id:06}"))
}

/// Parameters for one generate call.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Target date; defaults to the current UTC date.
    pub plan_date: Option<NaiveDate>,
    pub force_regenerate: bool,
    pub constraints: PlanningConstraints,
}

/// Parameters for one what-if call.
#[derive(Debug, Clone)]
pub struct SimulateRequest {
    /// Trainset code or opaque store identifier.
    pub target_train: String,
    pub modifications: TrainOverlay,
    /// Optional reference date the simulation is evaluated against.
    pub base_date: Option<NaiveDate>,
    pub constraints: PlanningConstraints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_trains: usize,
    pub critical_alerts: usize,
    pub average_confidence: f64,
    pub status: PlanStatus,
}

impl PlanSummary {
    fn of(plan: &InductionPlan) -> Self {
        Self {
            total_trains: plan.ranked_trains.len(),
            critical_alerts: plan.critical_alert_count(),
            average_confidence: plan.metrics.average_confidence,
            status: plan.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub plan: InductionPlan,
    pub summary: PlanSummary,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPlanView {
    pub plan: InductionPlan,
    pub summary: PlanSummary,
    pub top_trains: Vec<RankedTrain>,
    pub critical_alerts: Vec<Alert>,
}

/// Lightweight history projection: counts and alerts, no rankings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHistoryEntry {
    pub id: PlanId,
    pub plan_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub status: PlanStatus,
    pub total_ranked: usize,
    pub average_confidence: f64,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub plans: Vec<PlanHistoryEntry>,
    pub pagination: Pagination,
}

/// Read-time snapshot of the train behind a ranked entry. Absent when the
/// train has since been deleted; the stored reasoning stays authoritative.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub fitness: FitnessCertificate,
    pub maintenance_urgency: MaintenanceUrgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_maintenance: Option<i64>,
    pub current_mileage: u64,
    pub branding: Branding,
    pub current_location: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTrainExplanation {
    pub rank: u32,
    pub train: String,
    pub reasoning: String,
    pub confidence_score: u8,
    pub constraints: ConstraintReport,
    pub detailed_analysis: Option<DetailedAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExplanation {
    pub plan: InductionPlan,
    pub explanations: Vec<RankedTrainExplanation>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanServiceError {
    #[error("supervisor role or higher required")]
    SupervisorRequired,
    #[error("no trains available for planning")]
    NoTrainsAvailable,
    #[error("a finalized plan already exists for {plan_date}")]
    PlanAlreadyExists {
        plan_date: NaiveDate,
        existing: Box<InductionPlan>,
    },
    #[error("plan not found")]
    PlanNotFound,
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<T, P, X> InductionPlanService<T, P, X>
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
{
    pub fn new(trains: Arc<T>, plans: Arc<P>, external: Arc<X>) -> Self {
        Self {
            trains,
            plans,
            external,
        }
    }

    /// Produce and persist the FINALIZED plan for a date.
    ///
    /// Without `force_regenerate` an existing plan for the date is a
    /// conflict carrying that plan. With it, the old plan stays in history
    /// and the new one is appended.
    pub async fn generate(
        &self,
        caller: &CallerIdentity,
        request: GenerateRequest,
    ) -> Result<GeneratedPlan, PlanServiceError> {
        if !caller.role.may_plan() {
            return Err(PlanServiceError::SupervisorRequired);
        }

        let now = Utc::now();
        let plan_date = request.plan_date.unwrap_or_else(|| now.date_naive());

        if !request.force_regenerate {
            if let Some(existing) = self.plans.find_finalized_by_date(plan_date)? {
                return Err(PlanServiceError::PlanAlreadyExists {
                    plan_date,
                    existing: Box::new(existing),
                });
            }
        }

        let trains = self.trains.list_all()?;
        if trains.is_empty() {
            return Err(PlanServiceError::NoTrainsAvailable);
        }

        let outcome = self.optimize(&trains, &request.constraints, now).await;
        let alerts = alerts::generate_alerts(&trains, now);

        let plan = InductionPlan {
            id: next_plan_id(),
            plan_date,
            generated_at: now,
            status: PlanStatus::Finalized,
            ranked_trains: outcome.ranked_trains,
            alerts,
            metrics: outcome.metrics,
            simulation_params: None,
            generated_by: caller.subject.clone(),
            model_info: outcome.model_info,
        };

        let stored = match self.plans.insert(plan, request.force_regenerate) {
            Ok(stored) => stored,
            // lost the race past the pre-check; surface the winner instead
            Err(RepositoryError::DuplicatePlanDate {
                plan_date,
                existing,
            }) => {
                let existing = self
                    .plans
                    .find_by_id(&existing)?
                    .ok_or(PlanServiceError::PlanNotFound)?;
                return Err(PlanServiceError::PlanAlreadyExists {
                    plan_date,
                    existing: Box::new(existing),
                });
            }
            Err(other) => return Err(other.into()),
        };

        Ok(GeneratedPlan {
            summary: PlanSummary::of(&stored),
            processing_time_ms: stored.metrics.processing_time_ms,
            plan: stored,
        })
    }

    async fn optimize(
        &self,
        trains: &[Train],
        planning_constraints: &PlanningConstraints,
        now: DateTime<Utc>,
    ) -> OptimizationOutcome {
        match self.external.optimize(trains, planning_constraints).await {
            Ok(outcome) => outcome,
            Err(ExternalOptimizerError::Disabled) => {
                optimizer::optimize(trains, planning_constraints, now)
            }
            Err(error) => {
                warn!(%error, "external optimizer unavailable, using local ranking");
                optimizer::optimize(trains, planning_constraints, now)
            }
        }
    }

    /// Most recent FINALIZED plan with its dashboard summary.
    pub fn latest(&self) -> Result<LatestPlanView, PlanServiceError> {
        let plan = self
            .plans
            .find_latest_finalized()?
            .ok_or(PlanServiceError::PlanNotFound)?;

        let top_trains = plan.ranked_trains.iter().take(5).cloned().collect();
        let critical_alerts = plan
            .alerts
            .iter()
            .filter(|alert| alert.kind == AlertKind::Critical)
            .cloned()
            .collect();

        Ok(LatestPlanView {
            summary: PlanSummary::of(&plan),
            top_trains,
            critical_alerts,
            plan,
        })
    }

    /// Finalized plans newest first. `limit` is clamped into 1-100 and
    /// `page` is 1-based.
    pub fn history(&self, limit: usize, page: usize) -> Result<HistoryPage, PlanServiceError> {
        let limit = limit.clamp(1, 100);
        let page = page.max(1);
        let offset = (page - 1) * limit;

        let plans = self
            .plans
            .list_finalized(limit, offset)?
            .into_iter()
            .map(|plan| PlanHistoryEntry {
                id: plan.id.clone(),
                plan_date: plan.plan_date,
                generated_at: plan.generated_at,
                status: plan.status,
                total_ranked: plan.ranked_trains.len(),
                average_confidence: plan.metrics.average_confidence,
                alerts: plan.alerts,
            })
            .collect();
        let total = self.plans.count_finalized()?;

        Ok(HistoryPage {
            plans,
            pagination: Pagination { page, limit, total },
        })
    }

    /// Full plan with stored reasoning plus a fresh per-train analysis
    /// resolved against the current fleet registry.
    pub fn explain(&self, plan_id: &PlanId) -> Result<PlanExplanation, PlanServiceError> {
        let plan = self
            .plans
            .find_by_id(plan_id)?
            .ok_or(PlanServiceError::PlanNotFound)?;
        let now = Utc::now();

        let mut explanations = Vec::with_capacity(plan.ranked_trains.len());
        for entry in &plan.ranked_trains {
            let detailed_analysis =
                self.trains
                    .find_by_id(&entry.train_id)?
                    .map(|train| DetailedAnalysis {
                        maintenance_urgency: constraints::maintenance_urgency(&train, now),
                        days_since_last_maintenance: train.days_since_last_maintenance(now),
                        current_mileage: train.current_mileage,
                        fitness: train.fitness,
                        branding: train.branding,
                        current_location: train.current_location,
                    });

            let train = if entry.train_code.is_empty() {
                "unknown".to_string()
            } else {
                entry.train_code.clone()
            };

            explanations.push(RankedTrainExplanation {
                rank: entry.rank,
                train,
                reasoning: entry.reasoning.clone(),
                confidence_score: entry.confidence_score,
                constraints: entry.constraints.clone(),
                detailed_analysis,
            });
        }

        Ok(PlanExplanation { plan, explanations })
    }

    /// What-if run over the current fleet. Nothing is persisted; the caller
    /// gets a transient SIMULATION-status plan shape.
    pub fn simulate(
        &self,
        caller: &CallerIdentity,
        request: SimulateRequest,
    ) -> Result<SimulationOutcome, PlanServiceError> {
        if !caller.role.may_plan() {
            return Err(PlanServiceError::SupervisorRequired);
        }

        let now = request
            .base_date
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);

        let trains = self.trains.list_all()?;
        let outcome = simulation::simulate(
            &trains,
            &request.target_train,
            &request.modifications,
            &request.constraints,
            now,
        )?;
        Ok(outcome)
    }
}
