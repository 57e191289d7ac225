use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use talent_intake::config::AppConfig;
use talent_intake::crm::HubSpotClient;
use talent_intake::error::AppError;
use talent_intake::forms::FormCatalog;
use talent_intake::session::IntakeService;
use talent_intake::telemetry;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(FormCatalog::standard()?);
    let transport = Arc::new(HubSpotClient::new(config.crm.clone())?);
    let store = Arc::new(InMemorySessionStore::with_idle_ttl(Duration::from_secs(
        config.intake.session_idle_ttl_secs,
    )));
    spawn_idle_sweep(Arc::clone(&store));
    let intake_service = Arc::new(IntakeService::new(
        store,
        transport,
        catalog,
        config.intake.clone(),
    ));

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        failure_policy = ?config.intake.failure_policy,
        session_ttl_secs = config.intake.session_idle_ttl_secs,
        portal = %config.crm.portal_id,
        "talent intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Sweep idle sessions a few times per TTL so abandoned forms do not pile up.
fn spawn_idle_sweep(store: Arc<InMemorySessionStore>) {
    let period = (store.idle_ttl() / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.prune_idle() {
                Ok(0) => {}
                Ok(pruned) => info!(pruned, open = store.len(), "idle intake sessions swept"),
                Err(err) => warn!(error = %err, "idle session sweep failed"),
            }
        }
    });
}
