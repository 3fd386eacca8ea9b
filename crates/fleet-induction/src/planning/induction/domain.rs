use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for store-assigned trainset identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainId(pub String);

/// Identifier wrapper for persisted induction plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

/// Regulatory fitness certificate authorizing a trainset for revenue service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessCertificate {
    pub valid: bool,
    pub expiry: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_inspection: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Operational,
    MaintenanceDue,
    InMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CleaningStatus {
    Clean,
    CleaningDue,
    InCleaning,
}

/// Urgency bucket derived from days until the next maintenance deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceUrgency {
    Low,
    Medium,
    High,
    Critical,
}

fn default_branding_priority() -> u8 {
    1
}

/// Advertising wrap obligations attached to a trainset. Priority runs 1-5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub has_branding: bool,
    #[serde(default)]
    pub campaign: String,
    #[serde(default = "default_branding_priority")]
    pub priority: u8,
}

impl Branding {
    pub fn none() -> Self {
        Self {
            has_branding: false,
            campaign: String::new(),
            priority: default_branding_priority(),
        }
    }
}

/// One physical trainset as reported by the upstream fleet registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: TrainId,
    /// Human-readable trainset code, e.g. `TS-07`.
    pub code: String,
    pub fitness: FitnessCertificate,
    pub maintenance_status: MaintenanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_due: Option<DateTime<Utc>>,
    pub cleaning_status: CleaningStatus,
    /// Cumulative mileage in kilometres.
    pub current_mileage: u64,
    pub current_location: String,
    pub available_for_service: bool,
    #[serde(default)]
    pub total_operational_hours: u64,
    pub branding: Branding,
    /// Upstream performance metric on a 0-100 scale, when the registry has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_score: Option<f64>,
}

impl Train {
    /// Whole days since the last recorded maintenance, when known.
    pub fn days_since_last_maintenance(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_maintenance
            .map(|last| (now - last).num_seconds().div_euclid(86_400))
    }

    /// A train is service ready when its certificate is valid and unexpired,
    /// it is operational, and the depot has released it for service.
    pub fn service_ready(&self, now: DateTime<Utc>) -> bool {
        self.fitness.valid
            && self.fitness.expiry > now
            && self.maintenance_status == MaintenanceStatus::Operational
            && self.available_for_service
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,
    Finalized,
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Critical,
    Warning,
    Info,
}

/// Severity-graded operational alert emitted alongside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub train_code: String,
    pub severity: u8,
}

/// Per-constraint attribution stored with every ranked entry so the decision
/// can be audited without replaying the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintReport {
    pub fitness_valid: bool,
    pub maintenance_ready: bool,
    pub cleaning_status: CleaningStatus,
    pub branding_priority: u8,
    pub mileage_balance: f64,
}

/// One entry of the ranked induction list. Holds a weak reference to the
/// train (stable id plus the code verbatim); deleting the train later never
/// invalidates the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTrain {
    pub train_id: TrainId,
    pub train_code: String,
    pub rank: u32,
    pub reasoning: String,
    pub confidence_score: u8,
    pub constraints: ConstraintReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationMetrics {
    pub total_trains_evaluated: usize,
    pub constraints_satisfied: usize,
    pub average_confidence: f64,
    pub processing_time_ms: u64,
}

/// Provenance of the ranking algorithm that produced a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelInfo {
    pub version: String,
    pub algorithm: String,
    pub parameters: Value,
}

/// Parameters echoed back on simulation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub target_train: String,
    pub modifications: TrainOverlay,
}

/// Immutable record of one planning decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InductionPlan {
    pub id: PlanId,
    pub plan_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub status: PlanStatus,
    pub ranked_trains: Vec<RankedTrain>,
    pub alerts: Vec<Alert>,
    #[serde(rename = "optimizationMetrics")]
    pub metrics: OptimizationMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_params: Option<SimulationParams>,
    pub generated_by: String,
    #[serde(rename = "aiModelInfo")]
    pub model_info: AiModelInfo,
}

impl InductionPlan {
    pub fn critical_alert_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|alert| alert.kind == AlertKind::Critical)
            .count()
    }
}

/// Partial overlay applied to a train during what-if simulation. Top-level
/// fields replace; the nested `fitness` and `branding` records merge
/// field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<FitnessOverlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_due: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning_status: Option<CleaningStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_mileage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for_service: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<BrandingOverlay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_inspection: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_branding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

impl TrainOverlay {
    /// Produce the hypothetical train this overlay describes.
    pub fn apply_to(&self, train: &Train) -> Train {
        let mut modified = train.clone();

        if let Some(fitness) = &self.fitness {
            if let Some(valid) = fitness.valid {
                modified.fitness.valid = valid;
            }
            if let Some(expiry) = fitness.expiry {
                modified.fitness.expiry = expiry;
            }
            if let Some(last_inspection) = fitness.last_inspection {
                modified.fitness.last_inspection = Some(last_inspection);
            }
        }
        if let Some(status) = self.maintenance_status {
            modified.maintenance_status = status;
        }
        if let Some(due) = self.next_maintenance_due {
            modified.next_maintenance_due = Some(due);
        }
        if let Some(status) = self.cleaning_status {
            modified.cleaning_status = status;
        }
        if let Some(mileage) = self.current_mileage {
            modified.current_mileage = mileage;
        }
        if let Some(location) = &self.current_location {
            modified.current_location = location.clone();
        }
        if let Some(available) = self.available_for_service {
            modified.available_for_service = available;
        }
        if let Some(branding) = &self.branding {
            if let Some(has_branding) = branding.has_branding {
                modified.branding.has_branding = has_branding;
            }
            if let Some(campaign) = &branding.campaign {
                modified.branding.campaign = campaign.clone();
            }
            if let Some(priority) = branding.priority {
                modified.branding.priority = priority;
            }
        }

        modified
    }
}
