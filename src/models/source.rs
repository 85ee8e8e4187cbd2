use serde::{Deserialize, Serialize};

/// The fixed set of external sites this service knows how to query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Demand,
    Suppliers,
    Amazon,
    Flipkart,
    Meesho,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Demand => "demand",
            SourceId::Suppliers => "suppliers",
            SourceId::Amazon => "amazon",
            SourceId::Flipkart => "flipkart",
            SourceId::Meesho => "meesho",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceId::Demand => SourceKind::Demand,
            SourceId::Suppliers => SourceKind::Suppliers,
            SourceId::Amazon | SourceId::Flipkart | SourceId::Meesho => SourceKind::Competitor,
        }
    }
}

/// Which slice of the composite report a source feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Demand,
    Suppliers,
    Competitor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Plain HTTP fetch of the response body.
    Fetch,
    /// Rendered, script-executing browser session.
    Browser,
}

/// Everything the task runner needs to know about one source: where to
/// search, how to reach it, and which element marks a rendered result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: SourceId,
    pub url_template: String,
    /// Join character for whitespace in the product name. Varies per site
    /// and must be preserved literally ("+" for most, "%20" for Meesho).
    pub query_join: String,
    pub transport: Transport,
    pub wait_selector: Option<String>,
}

impl SourceSpec {
    pub fn search_url(&self, product_name: &str) -> String {
        let query = product_name.trim().replace(' ', &self.query_join);
        self.url_template.replace("{query}", &query)
    }
}

/// The default source registry: one demand signal, one supplier directory,
/// three competitor storefronts.
pub fn default_sources(competitor_transport: Transport) -> Vec<SourceSpec> {
    vec![
        SourceSpec {
            id: SourceId::Demand,
            url_template:
                "https://trends.google.com/trends/api/widgetdata/multiline?hl=en-US&tz=330&keyword={query}"
                    .to_string(),
            query_join: "+".to_string(),
            transport: Transport::Fetch,
            wait_selector: None,
        },
        SourceSpec {
            id: SourceId::Suppliers,
            url_template: "https://dir.indiamart.com/search.mp?ss={query}".to_string(),
            query_join: "+".to_string(),
            transport: Transport::Fetch,
            wait_selector: None,
        },
        SourceSpec {
            id: SourceId::Amazon,
            url_template: "https://www.amazon.in/s?k={query}".to_string(),
            query_join: "+".to_string(),
            transport: competitor_transport,
            wait_selector: Some(".a-price-whole".to_string()),
        },
        SourceSpec {
            id: SourceId::Flipkart,
            url_template: "https://www.flipkart.com/search?q={query}".to_string(),
            query_join: "+".to_string(),
            transport: competitor_transport,
            wait_selector: Some("._30jeq3, ._1_WHN1".to_string()),
        },
        SourceSpec {
            id: SourceId::Meesho,
            url_template: "https://www.meesho.com/search?q={query}".to_string(),
            query_join: "%20".to_string(),
            transport: competitor_transport,
            wait_selector: Some("h5".to_string()),
        },
    ]
}
