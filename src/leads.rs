use scraper::{Html, Selector};
use std::sync::Arc;

use crate::config::LeadsConfig;
use crate::fetcher::{FetchOutcome, RetryingFetcher, Sleeper, TokioSleeper};
use crate::identity::IdentityPool;
use crate::models::{Lead, LeadReport};

const DIRECTORY_PAGE_TEMPLATE: &str = "https://dir.indiamart.com/search.mp?ss={query}&pg={page}";

/// Sequential paginated crawl of the supplier directory. Deliberately
/// simple: one page at a time, a politeness delay between pages, and the
/// fetcher's own retries as the only failure handling. A page that cannot
/// be fetched is skipped, not fatal.
pub struct LeadHarvester {
    identities: Arc<IdentityPool>,
    fetcher: Arc<RetryingFetcher>,
    config: LeadsConfig,
    page_template: String,
    sleeper: Arc<dyn Sleeper>,
}

impl LeadHarvester {
    pub fn new(
        identities: Arc<IdentityPool>,
        fetcher: Arc<RetryingFetcher>,
        config: LeadsConfig,
    ) -> Self {
        Self {
            identities,
            fetcher,
            config,
            page_template: DIRECTORY_PAGE_TEMPLATE.to_string(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_page_template(mut self, template: impl Into<String>) -> Self {
        self.page_template = template.into();
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn harvest(&self, product_name: &str) -> LeadReport {
        let query = product_name.trim().replace(' ', "+");
        let mut leads: Vec<Lead> = Vec::new();

        for page in 1..=self.config.max_pages {
            if leads.len() >= self.config.max_leads {
                break;
            }

            let url = self
                .page_template
                .replace("{query}", &query)
                .replace("{page}", &page.to_string());
            let identity = self.identities.next();

            let body = match self.fetcher.fetch(&url, &identity).await {
                FetchOutcome::Ok(body) => body,
                outcome => {
                    tracing::warn!(page, ?outcome, "skipping unreachable directory page");
                    continue;
                }
            };

            let remaining = self.config.max_leads - leads.len();
            let mut page_leads = parse_directory_page(&body, remaining);
            if page_leads.is_empty() {
                tracing::debug!(page, "directory page held no listings");
            }
            leads.append(&mut page_leads);

            self.sleeper
                .sleep(std::time::Duration::from_millis(self.config.page_delay_ms))
                .await;
        }

        if leads.is_empty() {
            LeadReport {
                count: 0,
                leads,
                message: Some(format!(
                    "Could not find any leads for '{}'.",
                    product_name.trim()
                )),
            }
        } else {
            LeadReport {
                count: leads.len(),
                leads,
                message: None,
            }
        }
    }
}

/// Parse one directory page into leads, up to `limit`. Kept synchronous so
/// the parsed DOM never crosses an await point.
fn parse_directory_page(body: &str, limit: usize) -> Vec<Lead> {
    let listing_selector = Selector::parse("div.s-brd").unwrap();
    let name_selector = Selector::parse(".s-brd.cmp-nm").unwrap();
    let location_selector = Selector::parse(".s-add p").unwrap();
    let contact_selector = Selector::parse(".pns_h-b").unwrap();

    let document = Html::parse_document(body);
    let mut leads = Vec::new();

    for listing in document.select(&listing_selector) {
        if leads.len() >= limit {
            break;
        }

        let name = listing
            .select(&name_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string());
        let location = listing
            .select(&location_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string());

        // A row without both a name and a location is decoration, not a lead
        let (Some(name), Some(location)) = (name, location) else {
            continue;
        };
        if name.is_empty() || location.is_empty() {
            continue;
        }

        let contact = listing
            .select(&contact_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "Contact not found".to_string());

        leads.push(Lead {
            name,
            location,
            contact,
        });
    }

    leads
}
