use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use argus_insight::config::AppConfig;
use argus_insight::extractors::ExtractorSet;
use argus_insight::fetcher::RetryingFetcher;
use argus_insight::identity::IdentityPool;
use argus_insight::leads::LeadHarvester;
use argus_insight::models::default_sources;
use argus_insight::orchestrator::Orchestrator;
use argus_insight::runner::TaskRunner;
use argus_insight::session::SessionManager;
use argus_insight::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("argus_insight=debug".parse()?),
        )
        .init();

    info!("Starting Argus Insight...");

    let config = AppConfig::from_env()?;

    if config.metrics.enabled {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics.port))
            .install()?;
        info!("Prometheus metrics exposed on port {}", config.metrics.port);
    }

    let identities = Arc::new(IdentityPool::from_config(&config.identity)?);
    let fetcher = Arc::new(RetryingFetcher::new(&config.fetcher));
    let sessions = Arc::new(SessionManager::new(config.session.clone()));
    let extractors = Arc::new(ExtractorSet::with_defaults());

    let runner = Arc::new(TaskRunner::new(
        Arc::clone(&identities),
        Arc::clone(&fetcher),
        sessions,
        extractors,
        Duration::from_secs(config.session.navigation_timeout),
    ));

    let sources = default_sources(config.sources.competitor_transport);
    let deadline = config.server.report_deadline_secs.map(Duration::from_secs);
    let orchestrator = Arc::new(Orchestrator::new(runner, sources, deadline));
    let harvester = Arc::new(LeadHarvester::new(
        identities,
        fetcher,
        config.leads.clone(),
    ));

    let state = AppState {
        orchestrator,
        harvester,
        config: config.clone(),
    };

    web::serve(config, state).await
}
