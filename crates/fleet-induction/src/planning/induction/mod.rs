//! Nightly induction planning: constraint evaluation, weighted scoring,
//! ranking, alerting, what-if simulation, and the plan service facade with
//! its HTTP surface.

pub mod alerts;
pub mod auth;
pub mod constraints;
pub mod domain;
pub mod external;
pub mod optimizer;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use auth::{CallerIdentity, Role, TokenAuthenticator};
pub use domain::{
    Alert, AlertKind, AiModelInfo, Branding, BrandingOverlay, CleaningStatus, ConstraintReport,
    FitnessCertificate, FitnessOverlay, InductionPlan, MaintenanceStatus, MaintenanceUrgency,
    OptimizationMetrics, PlanId, PlanStatus, RankedTrain, SimulationParams, Train, TrainId,
    TrainOverlay,
};
pub use external::{ExternalOptimizer, ExternalOptimizerError, HttpOptimizerClient};
pub use optimizer::{OptimizationOutcome, FALLBACK_ALGORITHM, FALLBACK_VERSION};
pub use repository::{PlanRepository, RepositoryError, TrainRepository};
pub use router::{induction_router, PlanApiContext};
pub use scoring::{FleetContext, PlanningConstraints};
pub use service::{
    GenerateRequest, GeneratedPlan, HistoryPage, InductionPlanService, LatestPlanView,
    PlanExplanation, PlanServiceError, PlanSummary, SimulateRequest,
};
pub use simulation::{ImpactAnalysis, SimulationError, SimulationOutcome};
