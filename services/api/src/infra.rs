use chrono::NaiveDate;
use fleet_induction::planning::induction::{
    CallerIdentity, InductionPlan, PlanId, PlanRepository, PlanStatus, RepositoryError, Role,
    TokenAuthenticator, Train, TrainId, TrainRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTrainRepository {
    records: Arc<Mutex<HashMap<TrainId, Train>>>,
}

impl TrainRepository for InMemoryTrainRepository {
    fn list_all(&self) -> Result<Vec<Train>, RepositoryError> {
        let guard = self.records.lock().expect("train mutex poisoned");
        let mut trains: Vec<Train> = guard.values().cloned().collect();
        trains.sort_by(|left, right| left.code.cmp(&right.code));
        Ok(trains)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Train>, RepositoryError> {
        let guard = self.records.lock().expect("train mutex poisoned");
        Ok(guard.values().find(|train| train.code == code).cloned())
    }

    fn find_by_id(&self, id: &TrainId) -> Result<Option<Train>, RepositoryError> {
        let guard = self.records.lock().expect("train mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert(&self, train: Train) -> Result<Train, RepositoryError> {
        let mut guard = self.records.lock().expect("train mutex poisoned");
        guard.insert(train.id.clone(), train.clone());
        Ok(train)
    }

    fn delete(&self, id: &TrainId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("train mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// In-memory plan store. Holding the store lock across the duplicate check
/// and the append gives the same atomicity a unique index provides.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPlanRepository {
    records: Arc<Mutex<Vec<InductionPlan>>>,
}

impl InMemoryPlanRepository {
    fn finalized_newest_first(&self) -> Vec<InductionPlan> {
        let guard = self.records.lock().expect("plan mutex poisoned");
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

impl PlanRepository for InMemoryPlanRepository {
    fn insert(&self, plan: InductionPlan, force: bool) -> Result<InductionPlan, RepositoryError> {
        let mut guard = self.records.lock().expect("plan mutex poisoned");
        if plan.status == PlanStatus::Finalized && !force {
            if let Some(existing) = guard.iter().find(|stored| {
                stored.status == PlanStatus::Finalized && stored.plan_date == plan.plan_date
            }) {
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
        let guard = self.records.lock().expect("plan mutex poisoned");
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

/// Static bearer-token table resolving credentials issued by the upstream
/// auth system. Entries come from `API_AUTH_TOKENS`, a comma-separated list
/// of `token:subject:ROLE` triples.
#[derive(Default, Clone)]
pub(crate) struct StaticTokenAuthenticator {
    tokens: HashMap<String, CallerIdentity>,
}

impl StaticTokenAuthenticator {
    pub(crate) fn from_env() -> Self {
        let raw = std::env::var("API_AUTH_TOKENS").unwrap_or_default();
        Self {
            tokens: parse_auth_tokens(&raw),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_token(mut self, token: &str, subject: &str, role: Role) -> Self {
        self.tokens.insert(
            token.to_string(),
            CallerIdentity {
                subject: subject.to_string(),
                role,
            },
        );
        self
    }
}

impl TokenAuthenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<CallerIdentity> {
        self.tokens.get(token).cloned()
    }
}

pub(crate) fn parse_auth_tokens(raw: &str) -> HashMap<String, CallerIdentity> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let mut parts = entry.splitn(3, ':');
        let (Some(token), Some(subject), Some(role)) = (parts.next(), parts.next(), parts.next())
        else {
            tracing::warn!("skipping malformed API_AUTH_TOKENS entry");
            continue;
        };
        let role = match role.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "SUPERVISOR" => Role::Supervisor,
            "READER" => Role::Reader,
            _ => {
                tracing::warn!("skipping API_AUTH_TOKENS entry with unknown role");
                continue;
            }
        };
        tokens.insert(
            token.to_string(),
            CallerIdentity {
                subject: subject.to_string(),
                role,
            },
        );
    }
    tokens
}
