// Shared helpers for the integration suite: fixture pages served through
// wiremock, an instant sleeper that records requested delays, and wiring
// for an orchestrator whose sources all point at the mock server.

pub mod api_tests;
pub mod fetcher_tests;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argus_insight::config::{
    AppConfig, FetcherConfig, IdentityConfig, LeadsConfig, MetricsConfig, ProxyConfig,
    ServerConfig, SessionConfig, SourcesConfig,
};
use argus_insight::extractors::ExtractorSet;
use argus_insight::fetcher::{RetryingFetcher, Sleeper};
use argus_insight::identity::IdentityPool;
use argus_insight::leads::LeadHarvester;
use argus_insight::models::{SessionTopology, SourceSpec, Transport, default_sources};
use argus_insight::orchestrator::Orchestrator;
use argus_insight::runner::TaskRunner;
use argus_insight::session::SessionManager;
use argus_insight::web::AppState;

/// Sleeper that returns immediately and remembers every requested delay.
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            delays: Mutex::new(Vec::new()),
        })
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn test_identity_config() -> IdentityConfig {
    IdentityConfig {
        user_agents: vec!["TestAgent/1.0".to_string()],
        proxy: ProxyConfig {
            scheme: "http".to_string(),
            gateway: "127.0.0.1:8080".to_string(),
            username: None,
            password: None,
        },
    }
}

pub fn test_identity_pool() -> Arc<IdentityPool> {
    Arc::new(IdentityPool::from_config(&test_identity_config()).unwrap())
}

pub fn fast_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        max_attempts: 3,
        base_backoff_ms: 50,
        retry_delay_ms: 20,
        request_timeout: 2,
    }
}

pub fn test_app_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout: 30,
            shutdown_timeout: 5,
            report_deadline_secs: None,
        },
        identity: test_identity_config(),
        fetcher: fast_fetcher_config(),
        session: SessionConfig {
            topology: SessionTopology::PerTask,
            navigation_timeout: 5,
            chrome_path: None,
        },
        sources: SourcesConfig {
            competitor_transport: Transport::Fetch,
        },
        leads: LeadsConfig {
            max_leads: 10,
            max_pages: 2,
            page_delay_ms: 1,
        },
        metrics: MetricsConfig {
            enabled: false,
            port: 9001,
            endpoint: "/metrics".to_string(),
        },
    }
}

/// The default registry rewired so every source hits the mock server over
/// plain fetch.
pub fn mock_sources(base_url: &str) -> Vec<SourceSpec> {
    default_sources(Transport::Fetch)
        .into_iter()
        .map(|mut spec| {
            spec.url_template = format!("{}/{}?q={{query}}", base_url, spec.id.as_str());
            spec
        })
        .collect()
}

pub fn build_orchestrator(base_url: &str, deadline: Option<Duration>) -> Arc<Orchestrator> {
    let identities = test_identity_pool();
    let fetcher = Arc::new(RetryingFetcher::with_sleeper(
        &fast_fetcher_config(),
        RecordingSleeper::new(),
    ));
    let sessions = Arc::new(SessionManager::new(SessionConfig {
        topology: SessionTopology::PerTask,
        navigation_timeout: 5,
        chrome_path: None,
    }));
    let runner = Arc::new(TaskRunner::new(
        identities,
        fetcher,
        sessions,
        Arc::new(ExtractorSet::with_defaults()),
        Duration::from_secs(5),
    ));

    Arc::new(Orchestrator::new(runner, mock_sources(base_url), deadline))
}

pub fn build_app_state(base_url: &str) -> AppState {
    let config = test_app_config();
    let identities = test_identity_pool();
    let fetcher = Arc::new(RetryingFetcher::with_sleeper(
        &fast_fetcher_config(),
        RecordingSleeper::new(),
    ));
    let harvester = Arc::new(
        LeadHarvester::new(
            Arc::clone(&identities),
            Arc::clone(&fetcher),
            config.leads.clone(),
        )
        .with_page_template(format!("{}/directory?ss={{query}}&pg={{page}}", base_url))
        .with_sleeper(RecordingSleeper::new()),
    );

    AppState {
        orchestrator: build_orchestrator(base_url, None),
        harvester,
        config,
    }
}

// Fixture pages in each source's observed shape

pub const AMAZON_PAGE: &str = r#"
<html><body>
    <span class="a-price-whole">100</span>
    <span class="a-price-whole">200</span>
</body></html>
"#;

pub const FLIPKART_PAGE: &str = r#"
<html><body>
    <div class="_30jeq3">₹300</div>
</body></html>
"#;

pub const MEESHO_EMPTY_PAGE: &str = r#"
<html><body>
    <h5>Trending products</h5>
</body></html>
"#;

pub const SUPPLIER_PAGE: &str = r#"
<html><body>
    <div class="s-brd cmp-nm">Sharma Industries</div>
    <div class="s-brd s-add"><p>Mumbai, Maharashtra</p></div>
    <div class="s-brd cmp-nm">Gupta Exports</div>
    <div class="s-brd s-add"><p>Delhi</p></div>
</body></html>
"#;

pub const DIRECTORY_PAGE: &str = r#"
<html><body>
    <div class="s-brd">
        <div class="s-brd cmp-nm">Sharma Industries</div>
        <div class="s-add"><p>Mumbai, Maharashtra</p></div>
        <div class="pns_h-b">+91 98765 43210</div>
    </div>
    <div class="s-brd">
        <div class="s-brd cmp-nm">Gupta Exports</div>
        <div class="s-add"><p>Delhi</p></div>
    </div>
</body></html>
"#;

/// Interest-over-time body averaging to 80 (high interest).
pub fn demand_body() -> String {
    ")]}',\n{\"default\":{\"timelineData\":[{\"value\":[70]},{\"value\":[90]}]}}".to_string()
}
