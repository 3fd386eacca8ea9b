use crate::planning::induction::constraints::EvaluatedConstraints;
use crate::planning::induction::domain::{CleaningStatus, MaintenanceStatus, Train};

use super::FleetContext;

/// Accumulate the weighted score terms together with the reasoning phrase
/// each non-zero term contributes.
pub(crate) fn score_terms(
    train: &Train,
    evaluated: &EvaluatedConstraints,
    context: &FleetContext,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut phrases = Vec::new();

    if evaluated.fitness_valid {
        score += 30.0;
        phrases.push(format!(
            "Valid fitness certificate ({} days remaining)",
            evaluated.days_to_expiry
        ));
    }

    if train.maintenance_status == MaintenanceStatus::Operational {
        score += 25.0;
        phrases.push("Fully operational status".to_string());
        if !evaluated.maintenance_due {
            score += 10.0;
            phrases.push("No maintenance due".to_string());
        }
    }

    let mileage_balance = mileage_term(train.current_mileage, context.mean_mileage);
    if mileage_balance > 0.0 {
        score += mileage_balance;
        phrases.push(format!(
            "Current mileage: {}km",
            format_thousands(train.current_mileage)
        ));
    }

    if train.branding.has_branding {
        score += 2.0 * f64::from(train.branding.priority);
        phrases.push(format!("Branding priority: {}/5", train.branding.priority));
    }

    let performance = train.performance_score.unwrap_or(0.0);
    let reliability = train.reliability_score.unwrap_or(0.0);
    let record = 0.1 * performance + 0.1 * reliability;
    if record > 0.0 {
        score += record;
        phrases.push(format!(
            "Performance {performance:.0}/100, reliability {reliability:.0}/100"
        ));
    }

    if train.cleaning_status == CleaningStatus::Clean {
        score += 5.0;
        phrases.push("Excellent cleaning status".to_string());
    }

    (score, phrases)
}

/// Soft mileage-balancing contribution: full credit at the fleet mean,
/// decaying by one point per 1,000 km of deviation, floored at zero.
pub(crate) fn mileage_term(mileage: u64, mean_mileage: f64) -> f64 {
    let deviation = (mileage as f64 - mean_mileage).abs();
    (15.0 - deviation / 1000.0).max(0.0)
}

pub(crate) fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
