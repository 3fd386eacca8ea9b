use chrono::{DateTime, Utc};

use super::domain::{MaintenanceStatus, MaintenanceUrgency, Train};

/// Derived per-train constraint state for a single reference instant.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedConstraints {
    pub fitness_valid: bool,
    /// Whole days until certificate expiry; negative once expired.
    pub days_to_expiry: i64,
    pub maintenance_due: bool,
    pub maintenance_ready: bool,
    pub maintenance_urgency: MaintenanceUrgency,
    pub cleaning_ready: bool,
    /// Passes every hard safety filter and may be ranked.
    pub hard_eligible: bool,
}

/// Floor division keeps partially-elapsed days negative, so an expiry five
/// hours ago already reads as day -1.
pub(crate) fn whole_days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().div_euclid(86_400)
}

pub fn maintenance_urgency(train: &Train, now: DateTime<Utc>) -> MaintenanceUrgency {
    match train.next_maintenance_due {
        None => MaintenanceUrgency::Low,
        Some(due) => {
            let days = whole_days_until(due, now);
            if days <= 0 {
                MaintenanceUrgency::Critical
            } else if days <= 3 {
                MaintenanceUrgency::High
            } else if days <= 7 {
                MaintenanceUrgency::Medium
            } else {
                MaintenanceUrgency::Low
            }
        }
    }
}

/// Pure evaluation of one train against the hard and soft constraint model.
pub fn evaluate(train: &Train, now: DateTime<Utc>) -> EvaluatedConstraints {
    let fitness_valid = train.fitness.valid && train.fitness.expiry > now;
    let days_to_expiry = whole_days_until(train.fitness.expiry, now);

    let maintenance_due = train
        .next_maintenance_due
        .map(|due| due <= now)
        .unwrap_or(false)
        || train.maintenance_status == MaintenanceStatus::MaintenanceDue;
    let operational = train.maintenance_status == MaintenanceStatus::Operational;

    EvaluatedConstraints {
        fitness_valid,
        days_to_expiry,
        maintenance_due,
        maintenance_ready: operational && !maintenance_due,
        maintenance_urgency: maintenance_urgency(train, now),
        cleaning_ready: train.cleaning_status == super::domain::CleaningStatus::Clean,
        hard_eligible: fitness_valid && operational && train.available_for_service,
    }
}
