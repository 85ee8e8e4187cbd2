use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::{SessionTopology, Transport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub fetcher: FetcherConfig,
    pub session: SessionConfig,
    pub sources: SourcesConfig,
    pub leads: LeadsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64,
    pub shutdown_timeout: u64,
    /// Optional whole-report deadline. Tasks still pending when it expires
    /// are reported as failed and abandoned, not aborted.
    pub report_deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub user_agents: Vec<String>,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub scheme: String,
    /// Gateway address as host:port.
    pub gateway: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub max_attempts: u32,
    /// Rate-limit backoff unit; the delay grows with each attempt.
    pub base_backoff_ms: u64,
    /// Fixed delay between retries of transport and non-429 status failures.
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in seconds.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub topology: SessionTopology,
    /// Seconds to wait for navigation and marker elements.
    pub navigation_timeout: u64,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Competitor storefronts render prices with JavaScript, so they default
    /// to browser sessions; plain fetch is available for test fixtures and
    /// constrained environments.
    pub competitor_transport: Transport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadsConfig {
    pub max_leads: usize,
    pub max_pages: u32,
    /// Politeness delay between directory pages.
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub endpoint: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "ARGUS_"
            .add_source(Environment::with_prefix("ARGUS").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Proxy credentials come from the environment, never from files
        if config.identity.proxy.username.is_none() {
            config.identity.proxy.username = env::var("DATAIMPULSE_USER").ok();
        }
        if config.identity.proxy.password.is_none() {
            config.identity.proxy.password = env::var("DATAIMPULSE_PASS").ok();
        }

        // Add Chrome path from environment if not set
        if config.session.chrome_path.is_none() {
            config.session.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".into(),
            ));
        }

        if self.identity.user_agents.is_empty() {
            return Err(ConfigError::Message(
                "At least one user agent must be configured".into(),
            ));
        }

        if !self.identity.proxy.gateway.contains(':') {
            return Err(ConfigError::Message(
                "Proxy gateway must be a host:port address".into(),
            ));
        }

        if self.fetcher.max_attempts == 0 {
            return Err(ConfigError::Message(
                "Fetcher max_attempts must be greater than 0".into(),
            ));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Fetcher request_timeout must be greater than 0".into(),
            ));
        }

        if self.session.navigation_timeout == 0 {
            return Err(ConfigError::Message(
                "Session navigation_timeout must be greater than 0".into(),
            ));
        }

        if self.leads.max_leads == 0 || self.leads.max_pages == 0 {
            return Err(ConfigError::Message(
                "Lead harvesting limits must be greater than 0".into(),
            ));
        }

        if self.metrics.port == 0 {
            return Err(ConfigError::Message(
                "Metrics port must be greater than 0".into(),
            ));
        }

        if !self.metrics.endpoint.starts_with('/') {
            return Err(ConfigError::Message(
                "Metrics endpoint must start with '/'".into(),
            ));
        }

        Ok(())
    }
}
