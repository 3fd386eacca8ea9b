use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use crate::planning::induction::auth::{CallerIdentity, Role, TokenAuthenticator};
use crate::planning::induction::domain::{
    Branding, CleaningStatus, FitnessCertificate, InductionPlan, MaintenanceStatus, PlanId,
    PlanStatus, Train, TrainId,
};
use crate::planning::induction::external::{ExternalOptimizer, ExternalOptimizerError};
use crate::planning::induction::optimizer::OptimizationOutcome;
use crate::planning::induction::repository::{
    PlanRepository, RepositoryError, TrainRepository,
};
use crate::planning::induction::scoring::PlanningConstraints;
use crate::planning::induction::service::InductionPlanService;

pub(super) fn fleet_member(code: &str, mileage: u64, branding_priority: Option<u8>) -> Train {
    let now = Utc::now();
    Train {
        id: TrainId(format!("train-{code}")),
        code: code.to_string(),
        fitness: FitnessCertificate {
            valid: true,
            expiry: now + Duration::days(60),
            last_inspection: Some(now - Duration::days(20)),
        },
        maintenance_status: MaintenanceStatus::Operational,
        last_maintenance: Some(now - Duration::days(15)),
        next_maintenance_due: Some(now + Duration::days(30)),
        cleaning_status: CleaningStatus::Clean,
        current_mileage: mileage,
        current_location: "Muttom Yard".to_string(),
        available_for_service: true,
        total_operational_hours: 2400,
        branding: match branding_priority {
            Some(priority) => Branding {
                has_branding: true,
                campaign: "Kerala Tourism".to_string(),
                priority,
            },
            None => Branding::none(),
        },
        performance_score: None,
        reliability_score: None,
    }
}

/// The three-train reference fleet: branded TS-03 outranks TS-01 outranks
/// unbranded TS-02 under the weighted scorer.
pub(super) fn reference_fleet() -> Vec<Train> {
    vec![
        fleet_member("TS-01", 5000, Some(3)),
        fleet_member("TS-02", 5200, None),
        fleet_member("TS-03", 4800, Some(5)),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryTrainRepository {
    trains: Arc<Mutex<HashMap<TrainId, Train>>>,
}

impl MemoryTrainRepository {
    pub(super) fn seeded(fleet: Vec<Train>) -> Self {
        let repository = Self::default();
        for train in fleet {
            repository.upsert(train).expect("seed train");
        }
        repository
    }
}

impl TrainRepository for MemoryTrainRepository {
    fn list_all(&self) -> Result<Vec<Train>, RepositoryError> {
        let guard = self.trains.lock().expect("train mutex poisoned");
        let mut trains: Vec<Train> = guard.values().cloned().collect();
        trains.sort_by(|left, right| left.code.cmp(&right.code));
        Ok(trains)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Train>, RepositoryError> {
        let guard = self.trains.lock().expect("train mutex poisoned");
        Ok(guard.values().find(|train| train.code == code).cloned())
    }

    fn find_by_id(&self, id: &TrainId) -> Result<Option<Train>, RepositoryError> {
        let guard = self.trains.lock().expect("train mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert(&self, train: Train) -> Result<Train, RepositoryError> {
        let mut guard = self.trains.lock().expect("train mutex poisoned");
        guard.insert(train.id.clone(), train.clone());
        Ok(train)
    }

    fn delete(&self, id: &TrainId) -> Result<(), RepositoryError> {
        let mut guard = self.trains.lock().expect("train mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPlanRepository {
    plans: Arc<Mutex<Vec<InductionPlan>>>,
}

impl PlanRepository for MemoryPlanRepository {
    fn insert(&self, plan: InductionPlan, force: bool) -> Result<InductionPlan, RepositoryError> {
        let mut guard = self.plans.lock().expect("plan mutex poisoned");
        if plan.status == PlanStatus::Finalized && !force {
            if let Some(existing) = guard
                .iter()
                .find(|stored| {
                    stored.status == PlanStatus::Finalized && stored.plan_date == plan.plan_date
                })
            {
                return Err(RepositoryError::DuplicatePlanDate {
                    plan_date: plan.plan_date,
                    existing: existing.id.clone(),
                });
            }
        }
        guard.push(plan.clone());
        Ok(plan)
    }

    fn find_by_id(&self, id: &PlanId) -> Result<Option<InductionPlan>, RepositoryError> {
        let guard = self.plans.lock().expect("plan mutex poisoned");
        Ok(guard.iter().find(|plan| &plan.id == id).cloned())
    }

    fn find_latest_finalized(&self) -> Result<Option<InductionPlan>, RepositoryError> {
        Ok(self.finalized_newest_first().into_iter().next())
    }

    fn list_finalized(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InductionPlan>, RepositoryError> {
        Ok(self
            .finalized_newest_first()
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn count_finalized(&self) -> Result<usize, RepositoryError> {
        Ok(self.finalized_newest_first().len())
    }

    fn find_finalized_by_date(
        &self,
        plan_date: NaiveDate,
    ) -> Result<Option<InductionPlan>, RepositoryError> {
        Ok(self
            .finalized_newest_first()
            .into_iter()
            .find(|plan| plan.plan_date == plan_date))
    }
}

impl MemoryPlanRepository {
    fn finalized_newest_first(&self) -> Vec<InductionPlan> {
        let guard = self.plans.lock().expect("plan mutex poisoned");
        let mut finalized: Vec<InductionPlan> = guard
            .iter()
            .filter(|plan| plan.status == PlanStatus::Finalized)
            .cloned()
            .collect();
        finalized.sort_by(|left, right| {
            right
                .plan_date
                .cmp(&left.plan_date)
                .then_with(|| right.generated_at.cmp(&left.generated_at))
        });
        finalized
    }
}

/// Scripted stand-in for the remote optimizer.
pub(super) enum MockExternal {
    Disabled,
    Failing,
    Scripted(OptimizationOutcome),
}

#[async_trait]
impl ExternalOptimizer for MockExternal {
    async fn optimize(
        &self,
        _trains: &[Train],
        _constraints: &PlanningConstraints,
    ) -> Result<OptimizationOutcome, ExternalOptimizerError> {
        match self {
            MockExternal::Disabled => Err(ExternalOptimizerError::Disabled),
            MockExternal::Failing => Err(ExternalOptimizerError::MalformedResponse),
            MockExternal::Scripted(outcome) => Ok(outcome.clone()),
        }
    }
}

#[derive(Default, Clone)]
pub(super) struct StaticTokens;

impl TokenAuthenticator for StaticTokens {
    fn authenticate(&self, token: &str) -> Option<CallerIdentity> {
        match token {
            "supervisor-token" => Some(CallerIdentity {
                subject: "shift-supervisor".to_string(),
                role: Role::Supervisor,
            }),
            "admin-token" => Some(CallerIdentity {
                subject: "depot-admin".to_string(),
                role: Role::Admin,
            }),
            "reader-token" => Some(CallerIdentity {
                subject: "ops-viewer".to_string(),
                role: Role::Reader,
            }),
            _ => None,
        }
    }
}

pub(super) fn supervisor() -> CallerIdentity {
    CallerIdentity {
        subject: "shift-supervisor".to_string(),
        role: Role::Supervisor,
    }
}

pub(super) fn reader() -> CallerIdentity {
    CallerIdentity {
        subject: "ops-viewer".to_string(),
        role: Role::Reader,
    }
}

pub(super) type TestService =
    InductionPlanService<MemoryTrainRepository, MemoryPlanRepository, MockExternal>;

pub(super) fn build_service(
    fleet: Vec<Train>,
    external: MockExternal,
) -> (
    Arc<TestService>,
    Arc<MemoryTrainRepository>,
    Arc<MemoryPlanRepository>,
) {
    let trains = Arc::new(MemoryTrainRepository::seeded(fleet));
    let plans = Arc::new(MemoryPlanRepository::default());
    let service = Arc::new(InductionPlanService::new(
        trains.clone(),
        plans.clone(),
        Arc::new(external),
    ));
    (service, trains, plans)
}
