use scraper::{Html, Selector};

use crate::extractors::{decimal_price, ExtractionResult, Extractor, MAX_ITEMS};
use crate::models::{SourceId, SourcePayload};

/// Reads listing prices from Amazon search results. The whole-rupee part of
/// each price carries thousands separators that must be stripped first.
pub struct AmazonExtractor {
    price_selector: Selector,
}

impl AmazonExtractor {
    pub fn new() -> Self {
        Self {
            price_selector: Selector::parse(".a-price-whole").unwrap(),
        }
    }
}

impl Default for AmazonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for AmazonExtractor {
    fn source_id(&self) -> SourceId {
        SourceId::Amazon
    }

    fn extract(&self, raw: &str) -> ExtractionResult {
        let document = Html::parse_document(raw);

        let prices: Vec<f64> = document
            .select(&self.price_selector)
            .take(MAX_ITEMS)
            .filter_map(|element| {
                let text = element.text().collect::<String>().replace(',', "");
                decimal_price(&text)
            })
            .collect();

        if prices.is_empty() {
            ExtractionResult::Empty
        } else {
            ExtractionResult::Data(SourcePayload::Prices(prices))
        }
    }
}
