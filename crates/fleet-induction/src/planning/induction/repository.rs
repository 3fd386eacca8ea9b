use chrono::NaiveDate;

use super::domain::{InductionPlan, PlanId, Train, TrainId};

/// Storage abstraction over the fleet registry so the engine can be
/// exercised against an in-memory store.
pub trait TrainRepository: Send + Sync {
    fn list_all(&self) -> Result<Vec<Train>, RepositoryError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Train>, RepositoryError>;
    fn find_by_id(&self, id: &TrainId) -> Result<Option<Train>, RepositoryError>;
    fn upsert(&self, train: Train) -> Result<Train, RepositoryError>;
    fn delete(&self, id: &TrainId) -> Result<(), RepositoryError>;
}

/// Plan persistence contract.
///
/// `insert` must enforce uniqueness of `(plan_date, FINALIZED)` atomically
/// with respect to concurrent callers unless `force` is set: of two racing
/// generates for the same date, exactly one may win.
pub trait PlanRepository: Send + Sync {
    fn insert(&self, plan: InductionPlan, force: bool) -> Result<InductionPlan, RepositoryError>;
    fn find_by_id(&self, id: &PlanId) -> Result<Option<InductionPlan>, RepositoryError>;
    fn find_latest_finalized(&self) -> Result<Option<InductionPlan>, RepositoryError>;
    /// Finalized plans newest first, bounded by `limit` after skipping
    /// `offset` entries.
    fn list_finalized(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InductionPlan>, RepositoryError>;
    fn count_finalized(&self) -> Result<usize, RepositoryError>;
    fn find_finalized_by_date(
        &self,
        plan_date: NaiveDate,
    ) -> Result<Option<InductionPlan>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a finalized plan already exists for {plan_date}")]
    DuplicatePlanDate {
        plan_date: NaiveDate,
        existing: PlanId,
    },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
