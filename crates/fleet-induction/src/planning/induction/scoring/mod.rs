mod config;
mod rules;

pub use config::PlanningConstraints;

use chrono::{DateTime, Utc};

use super::constraints::EvaluatedConstraints;
use super::domain::{ConstraintReport, Train};

/// Fleet-wide context shared by every per-train scoring call.
#[derive(Debug, Clone, Copy)]
pub struct FleetContext {
    /// Arithmetic mean of current mileage across the candidate pool.
    pub mean_mileage: f64,
    pub now: DateTime<Utc>,
}

/// Score plus the human-readable trace it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainScore {
    pub score: f64,
    pub confidence_score: u8,
    pub reasoning: String,
    pub constraints: ConstraintReport,
}

/// Pure weighted scoring of one candidate. The reasoning string lists every
/// non-zero term with its concrete numbers and closes with the rounded total,
/// so the justification can be reproduced from the inputs alone.
pub fn score(train: &Train, evaluated: &EvaluatedConstraints, context: &FleetContext) -> TrainScore {
    let (score, mut phrases) = rules::score_terms(train, evaluated, context);

    phrases.push(format!("Overall optimization score: {}", score.round()));

    TrainScore {
        score,
        confidence_score: confidence(score),
        reasoning: phrases.join("; "),
        constraints: ConstraintReport {
            fitness_valid: evaluated.fitness_valid,
            maintenance_ready: evaluated.maintenance_ready,
            cleaning_status: train.cleaning_status,
            branding_priority: if train.branding.has_branding {
                train.branding.priority
            } else {
                0
            },
            mileage_balance: rules::mileage_term(train.current_mileage, context.mean_mileage),
        },
    }
}

/// Compress the raw score into the 60-100 band users read as a certainty
/// percentage. Ordering is preserved; zero or negative scores still land on
/// 60 to distinguish "ranked but weak" from "excluded".
fn confidence(score: f64) -> u8 {
    score.round().clamp(60.0, 100.0) as u8
}
