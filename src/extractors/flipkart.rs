use regex::Regex;
use scraper::{Html, Selector};

use crate::extractors::{decimal_price, ExtractionResult, Extractor, MAX_ITEMS};
use crate::models::{SourceId, SourcePayload};

/// Reads listing prices from Flipkart search results. Price nodes carry the
/// currency glyph and separators inline, so everything but digits and the
/// decimal point is stripped before parsing.
pub struct FlipkartExtractor {
    price_selector: Selector,
    cleanup: Regex,
}

impl FlipkartExtractor {
    pub fn new() -> Self {
        Self {
            price_selector: Selector::parse("._30jeq3, ._1_WHN1").unwrap(),
            cleanup: Regex::new(r"[^\d.]").unwrap(),
        }
    }
}

impl Default for FlipkartExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for FlipkartExtractor {
    fn source_id(&self) -> SourceId {
        SourceId::Flipkart
    }

    fn extract(&self, raw: &str) -> ExtractionResult {
        let document = Html::parse_document(raw);

        let prices: Vec<f64> = document
            .select(&self.price_selector)
            .take(MAX_ITEMS)
            .filter_map(|element| {
                let text = element.text().collect::<String>();
                let cleaned = self.cleanup.replace_all(&text, "");
                decimal_price(&cleaned)
            })
            .collect();

        if prices.is_empty() {
            ExtractionResult::Empty
        } else {
            ExtractionResult::Data(SourcePayload::Prices(prices))
        }
    }
}
