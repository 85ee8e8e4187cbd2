use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

use crate::config::IdentityConfig;
use crate::utils::error::{AppError, Result};

/// One disguise for one outbound request: a user agent plus the proxy the
/// request egresses through. Immutable once issued; the same identity may be
/// handed to several concurrent tasks.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_agent: String,
    pub proxy_endpoint: Option<Url>,
}

/// Round-robin supplier of identities. The cursor is the only piece of
/// state shared across concurrent requests in the whole service.
pub struct IdentityPool {
    user_agents: Vec<String>,
    proxy_endpoint: Option<Url>,
    cursor: AtomicUsize,
}

impl IdentityPool {
    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        if config.user_agents.is_empty() {
            return Err(AppError::Validation(
                "identity pool requires at least one user agent".to_string(),
            ));
        }

        let proxy_endpoint = match (&config.proxy.username, &config.proxy.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                let raw = format!(
                    "{}://{}:{}@{}",
                    config.proxy.scheme, user, pass, config.proxy.gateway
                );
                Some(Url::parse(&raw)?)
            }
            _ => {
                // Fail-open: without credentials every request egresses
                // directly, for all sources alike.
                tracing::warn!(
                    "No proxy credentials configured; scraping will use direct connections"
                );
                None
            }
        };

        Ok(Self {
            user_agents: config.user_agents.clone(),
            proxy_endpoint,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Issue the next identity. Safe to call from any number of tasks; each
    /// call advances the cursor exactly once.
    pub fn next(&self) -> Identity {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.user_agents.len();
        Identity {
            user_agent: self.user_agents[index].clone(),
            proxy_endpoint: self.proxy_endpoint.clone(),
        }
    }

    /// Total identities issued since process start.
    pub fn issued(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy_endpoint.is_some()
    }
}
