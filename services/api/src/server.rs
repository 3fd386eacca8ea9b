use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryPlanRepository, InMemoryTrainRepository, StaticTokenAuthenticator,
};
use crate::routes::with_plan_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_induction::config::AppConfig;
use fleet_induction::error::AppError;
use fleet_induction::planning::induction::{
    HttpOptimizerClient, InductionPlanService, PlanApiContext,
};
use fleet_induction::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(bind) = args.bind.take() {
        config.server.bind = bind;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.database.url.is_some() {
        debug!("DB_URL present; this build binds the in-memory repositories");
    }

    let trains = Arc::new(InMemoryTrainRepository::default());
    let plans = Arc::new(InMemoryPlanRepository::default());
    let external = Arc::new(HttpOptimizerClient::new(
        config.optimizer.external_url.clone(),
        config.optimizer.timeout,
    )?);
    let service = Arc::new(InductionPlanService::new(trains, plans, external));
    let authenticator = Arc::new(StaticTokenAuthenticator::from_env());

    let app = with_plan_routes(PlanApiContext {
        service,
        authenticator,
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "induction planning service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
