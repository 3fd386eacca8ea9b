use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter {
        directives: String,
        source: ParseError,
    },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "invalid log filter '{}'", directives)
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// The configured level applies to the planning crates; the HTTP client
/// internals are pinned to warn so nightly plan runs under debug logging do
/// not drown the optimizer-fallback warnings in connection chatter.
fn filter_directives(log_level: &str) -> String {
    format!("{log_level},hyper=warn,reqwest=warn")
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = filter_directives(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
                directives,
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_pin_http_client_noise_to_warn() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("hyper=warn"));
        assert!(directives.contains("reqwest=warn"));
    }

    #[test]
    fn directives_build_a_valid_filter() {
        let directives = filter_directives("info");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
