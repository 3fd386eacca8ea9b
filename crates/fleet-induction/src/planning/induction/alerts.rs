use chrono::{DateTime, Utc};

use super::constraints;
use super::domain::{Alert, AlertKind, CleaningStatus, Train};

/// Emit severity-graded alerts across the whole fleet, ineligible trains
/// included. At most one alert per train per category; the result is sorted
/// by severity descending and is stable within a severity.
pub fn generate_alerts(trains: &[Train], now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for train in trains {
        let evaluated = constraints::evaluate(train, now);

        if let Some(alert) = expiry_alert(train, evaluated.days_to_expiry) {
            alerts.push(alert);
        }

        if evaluated.maintenance_due {
            alerts.push(Alert {
                kind: AlertKind::Warning,
                message: format!("{} maintenance is due", train.code),
                train_code: train.code.clone(),
                severity: 4,
            });
        }

        if !train.available_for_service {
            alerts.push(Alert {
                kind: AlertKind::Info,
                message: format!("{} is not available for service", train.code),
                train_code: train.code.clone(),
                severity: 2,
            });
        }

        if train.cleaning_status == CleaningStatus::CleaningDue {
            alerts.push(Alert {
                kind: AlertKind::Warning,
                message: format!("{} requires cleaning", train.code),
                train_code: train.code.clone(),
                severity: 2,
            });
        }
    }

    // sort_by is stable, so equal severities keep fleet order
    alerts.sort_by(|left, right| right.severity.cmp(&left.severity));
    alerts
}

fn expiry_alert(train: &Train, days_to_expiry: i64) -> Option<Alert> {
    let (kind, severity, message) = match days_to_expiry {
        days if days < 0 => (
            AlertKind::Critical,
            5,
            format!("{} fitness certificate has expired", train.code),
        ),
        days @ 0..=3 => (
            AlertKind::Critical,
            5,
            format!("{} fitness certificate expires in {days} days", train.code),
        ),
        days @ 4..=7 => (
            AlertKind::Warning,
            3,
            format!("{} fitness certificate expires in {days} days", train.code),
        ),
        days @ 8..=14 => (
            AlertKind::Info,
            2,
            format!("{} fitness certificate expires in {days} days", train.code),
        ),
        _ => return None,
    };

    Some(Alert {
        kind,
        message,
        train_code: train.code.clone(),
        severity,
    })
}
