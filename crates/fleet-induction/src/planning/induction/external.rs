use std::time::Duration;

use async_trait::async_trait;

use super::domain::Train;
use super::optimizer::OptimizationOutcome;
use super::scoring::PlanningConstraints;

#[derive(Debug, thiserror::Error)]
pub enum ExternalOptimizerError {
    #[error("no external optimizer configured")]
    Disabled,
    #[error("external optimizer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("external optimizer returned a malformed response")]
    MalformedResponse,
}

/// Pluggable remote optimizer. The plan service treats any error as a signal
/// to fall back to the local rule-based ranking; availability beats
/// optimality.
#[async_trait]
pub trait ExternalOptimizer: Send + Sync {
    async fn optimize(
        &self,
        trains: &[Train],
        constraints: &PlanningConstraints,
    ) -> Result<OptimizationOutcome, ExternalOptimizerError>;
}

#[derive(serde::Serialize)]
struct OptimizeRequest<'a> {
    trains: &'a [Train],
    constraints: &'a PlanningConstraints,
}

/// HTTP-JSON client for the remote optimizer endpoint. Holds one shared
/// `reqwest::Client`, safe for concurrent use; the configured timeout bounds
/// every call, and dropping the future cancels the in-flight request.
pub struct HttpOptimizerClient {
    base_url: Option<String>,
    client: reqwest::Client,
}

impl HttpOptimizerClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// `base_url` of `None` disables the remote path entirely, so every
    /// optimization runs locally.
    pub fn new(
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ExternalOptimizerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn disabled() -> Self {
        Self {
            base_url: None,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ExternalOptimizer for HttpOptimizerClient {
    async fn optimize(
        &self,
        trains: &[Train],
        constraints: &PlanningConstraints,
    ) -> Result<OptimizationOutcome, ExternalOptimizerError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(ExternalOptimizerError::Disabled)?;
        let endpoint = format!("{}/optimize", base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(endpoint)
            .json(&OptimizeRequest {
                trains,
                constraints,
            })
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<OptimizationOutcome>()
            .await
            .map_err(|_| ExternalOptimizerError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_reports_disabled() {
        let client = HttpOptimizerClient::disabled();
        let result = client
            .optimize(&[], &PlanningConstraints::default())
            .await;
        assert!(matches!(result, Err(ExternalOptimizerError::Disabled)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = HttpOptimizerClient::new(
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_millis(200),
        )
        .expect("client builds");

        let result = client
            .optimize(&[], &PlanningConstraints::default())
            .await;
        assert!(matches!(
            result,
            Err(ExternalOptimizerError::Transport(_))
        ));
    }
}
