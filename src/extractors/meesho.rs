use regex::Regex;
use scraper::{Html, Selector};

use crate::extractors::{decimal_price, ExtractionResult, Extractor, MAX_ITEMS};
use crate::models::{SourceId, SourcePayload};

/// Reads listing prices from Meesho search results. The site has no stable
/// price class, so candidate headings are filtered by the rupee glyph.
pub struct MeeshoExtractor {
    heading_selector: Selector,
    cleanup: Regex,
}

impl MeeshoExtractor {
    pub fn new() -> Self {
        Self {
            heading_selector: Selector::parse("h5").unwrap(),
            cleanup: Regex::new(r"[^\d.]").unwrap(),
        }
    }
}

impl Default for MeeshoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for MeeshoExtractor {
    fn source_id(&self) -> SourceId {
        SourceId::Meesho
    }

    fn extract(&self, raw: &str) -> ExtractionResult {
        let document = Html::parse_document(raw);

        let prices: Vec<f64> = document
            .select(&self.heading_selector)
            .filter_map(|element| {
                let text = element.text().collect::<String>();
                if !text.contains('₹') {
                    return None;
                }
                let cleaned = self.cleanup.replace_all(&text, "");
                decimal_price(&cleaned)
            })
            .take(MAX_ITEMS)
            .collect();

        if prices.is_empty() {
            ExtractionResult::Empty
        } else {
            ExtractionResult::Data(SourcePayload::Prices(prices))
        }
    }
}
