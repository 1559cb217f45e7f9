use helpdesk_stats::backend::ConfigBackend;
use helpdesk_stats::filters::FilterState;
use helpdesk_stats::models::StatisticsSnapshot;
use helpdesk_stats::source::{fetch_with_retry, HttpSource};
use helpdesk_stats::{
    load_overview, load_snapshot, router, AppState, DashboardConfig, FilteredStatisticsView,
    OverviewBoard, ViewConfig,
};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const STARTUP_ATTEMPTS: u32 = 3;
const STARTUP_BACKOFF: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DashboardConfig::from_env()?;
    let source = HttpSource::new(&config.upstream_url, config.timeout)?;
    info!(
        role = %config.role,
        endpoint = source.endpoint(),
        "starting statistics dashboard"
    );

    let snapshot = initial_snapshot(&config, &source).await?;
    let backend = ConfigBackend::with_targets(config.visible_targets());
    let view = FilteredStatisticsView::initialize(
        ViewConfig::new(snapshot, config.role, config.assignments.clone()),
        source,
        backend,
    )?;

    let overview = match &config.overview_path {
        Some(path) => match load_overview(path).await {
            Some(snapshot) => OverviewBoard::build(&snapshot, config.visible_overview_targets()),
            None => {
                warn!("no overview data in {}, overview page stays empty", path.display());
                OverviewBoard::empty()
            }
        },
        None => OverviewBoard::empty(),
    };

    let app = router(AppState::new(view, overview));

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn initial_snapshot(
    config: &DashboardConfig,
    source: &HttpSource,
) -> Result<StatisticsSnapshot, Box<dyn std::error::Error>> {
    if let Some(path) = &config.snapshot_path {
        if let Some(snapshot) = load_snapshot(path).await {
            return Ok(snapshot);
        }
    }

    // Dropdown options come from this snapshot, so there is no starting without one.
    let filters = FilterState::initial(config.role, &config.assignments)?;
    let snapshot = fetch_with_retry(source, &filters, STARTUP_ATTEMPTS, STARTUP_BACKOFF)
        .await
        .map_err(|err| {
            error!("no initial statistics from {}: {err}", source.endpoint());
            err
        })?;
    Ok(snapshot)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
