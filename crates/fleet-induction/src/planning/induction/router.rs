use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::{CallerIdentity, TokenAuthenticator};
use super::domain::{PlanId, TrainOverlay};
use super::external::ExternalOptimizer;
use super::repository::{PlanRepository, TrainRepository};
use super::scoring::PlanningConstraints;
use super::service::{
    GenerateRequest, InductionPlanService, PlanServiceError, SimulateRequest,
};
use super::simulation::SimulationError;

/// Shared handler state: the service facade plus the credential resolver.
pub struct PlanApiContext<T, P, X, A> {
    pub service: Arc<InductionPlanService<T, P, X>>,
    pub authenticator: Arc<A>,
}

impl<T, P, X, A> Clone for PlanApiContext<T, P, X, A> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

/// Router builder exposing the induction planning endpoints.
pub fn induction_router<T, P, X, A>(context: PlanApiContext<T, P, X, A>) -> Router
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    Router::new()
        .route("/api/induction/latest", get(latest_handler::<T, P, X, A>))
        .route("/api/induction/history", get(history_handler::<T, P, X, A>))
        .route(
            "/api/induction/explain/:plan_id",
            get(explain_handler::<T, P, X, A>),
        )
        .route(
            "/api/induction/generate",
            post(generate_handler::<T, P, X, A>),
        )
        .route(
            "/api/induction/simulate",
            post(simulate_handler::<T, P, X, A>),
        )
        .with_state(context)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateBody {
    #[serde(default)]
    plan_date: Option<NaiveDate>,
    #[serde(default)]
    force_regenerate: bool,
    #[serde(default)]
    constraints: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulateBody {
    train_id: String,
    modifications: TrainOverlay,
    #[serde(default)]
    base_date: Option<NaiveDate>,
    #[serde(default)]
    constraints: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryQuery {
    limit: Option<usize>,
    page: Option<usize>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authenticate<A: TokenAuthenticator>(
    authenticator: &A,
    headers: &HeaderMap,
) -> Result<CallerIdentity, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token.and_then(|token| authenticator.authenticate(token)) {
        Some(caller) => Ok(caller),
        None => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "missing or invalid bearer credential",
        )),
    }
}

fn plan_error_response(error: PlanServiceError) -> Response {
    match error {
        PlanServiceError::SupervisorRequired => {
            error_response(StatusCode::FORBIDDEN, &error.to_string())
        }
        PlanServiceError::NoTrainsAvailable => {
            error_response(StatusCode::BAD_REQUEST, &error.to_string())
        }
        PlanServiceError::PlanAlreadyExists { existing, .. } => {
            let payload = json!({
                "existingPlan": *existing,
                "suggestion": "retry with forceRegenerate to supersede the plan for this date",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        PlanServiceError::PlanNotFound => {
            error_response(StatusCode::NOT_FOUND, &error.to_string())
        }
        PlanServiceError::Simulation(SimulationError::TrainNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, &error.to_string())
        }
        PlanServiceError::Repository(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
    }
}

pub(crate) async fn generate_handler<T, P, X, A>(
    State(context): State<PlanApiContext<T, P, X, A>>,
    headers: HeaderMap,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    let caller = match authenticate(context.authenticator.as_ref(), &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let request = GenerateRequest {
        plan_date: body.plan_date,
        force_regenerate: body.force_regenerate,
        constraints: PlanningConstraints(body.constraints.unwrap_or(Value::Null)),
    };

    match context.service.generate(&caller, request).await {
        Ok(generated) => {
            let payload = json!({
                "plan": generated.plan,
                "summary": generated.summary,
                "processingTime": generated.processing_time_ms,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => plan_error_response(error),
    }
}

pub(crate) async fn simulate_handler<T, P, X, A>(
    State(context): State<PlanApiContext<T, P, X, A>>,
    headers: HeaderMap,
    body: Result<Json<SimulateBody>, JsonRejection>,
) -> Response
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    let caller = match authenticate(context.authenticator.as_ref(), &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let request = SimulateRequest {
        target_train: body.train_id,
        modifications: body.modifications,
        base_date: body.base_date,
        constraints: PlanningConstraints(body.constraints.unwrap_or(Value::Null)),
    };

    match context.service.simulate(&caller, request) {
        Ok(simulation) => {
            (StatusCode::OK, Json(json!({ "simulation": simulation }))).into_response()
        }
        Err(error) => plan_error_response(error),
    }
}

pub(crate) async fn latest_handler<T, P, X, A>(
    State(context): State<PlanApiContext<T, P, X, A>>,
    headers: HeaderMap,
) -> Response
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    if let Err(response) = authenticate(context.authenticator.as_ref(), &headers) {
        return response;
    }

    match context.service.latest() {
        Ok(view) => {
            let payload = json!({
                "plan": view.plan,
                "summary": view.summary,
                "topTrains": view.top_trains,
                "criticalAlerts": view.critical_alerts,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => plan_error_response(error),
    }
}

pub(crate) async fn history_handler<T, P, X, A>(
    State(context): State<PlanApiContext<T, P, X, A>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    if let Err(response) = authenticate(context.authenticator.as_ref(), &headers) {
        return response;
    }

    let limit = query.limit.unwrap_or(10);
    let page = query.page.unwrap_or(1);

    match context.service.history(limit, page) {
        Ok(history) => {
            let payload = json!({
                "plans": history.plans,
                "pagination": history.pagination,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => plan_error_response(error),
    }
}

pub(crate) async fn explain_handler<T, P, X, A>(
    State(context): State<PlanApiContext<T, P, X, A>>,
    headers: HeaderMap,
    Path(plan_id): Path<String>,
) -> Response
where
    T: TrainRepository + 'static,
    P: PlanRepository + 'static,
    X: ExternalOptimizer + 'static,
    A: TokenAuthenticator + 'static,
{
    if let Err(response) = authenticate(context.authenticator.as_ref(), &headers) {
        return response;
    }

    match context.service.explain(&PlanId(plan_id)) {
        Ok(explanation) => {
            let payload = json!({
                "plan": &explanation.plan,
                "explanations": &explanation.explanations,
                "optimizationMetrics": &explanation.plan.metrics,
                "aiModelInfo": &explanation.plan.model_info,
                "alerts": &explanation.plan.alerts,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => plan_error_response(error),
    }
}
