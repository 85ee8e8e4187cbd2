use scraper::{Html, Selector};

use crate::extractors::{ExtractionResult, Extractor, MAX_ITEMS};
use crate::models::{SourceId, SourcePayload, Supplier};

/// Pulls supplier names and locations from the directory's search results.
/// A listing without a readable location keeps its name and gets a sentinel
/// location instead of sinking the whole extraction.
pub struct SupplierExtractor {
    name_selector: Selector,
    location_selector: Selector,
    location_line: Selector,
}

impl SupplierExtractor {
    pub fn new() -> Self {
        Self {
            name_selector: Selector::parse(".s-brd.cmp-nm").unwrap(),
            location_selector: Selector::parse(".s-brd.s-add").unwrap(),
            location_line: Selector::parse("p").unwrap(),
        }
    }
}

impl Default for SupplierExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for SupplierExtractor {
    fn source_id(&self) -> SourceId {
        SourceId::Suppliers
    }

    fn extract(&self, raw: &str) -> ExtractionResult {
        let document = Html::parse_document(raw);

        let names = document.select(&self.name_selector);
        let locations: Vec<_> = document.select(&self.location_selector).collect();

        let mut suppliers = Vec::new();
        for (index, name_element) in names.take(MAX_ITEMS).enumerate() {
            let name = name_element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if name.is_empty() {
                continue;
            }

            // The location block wraps its address in the first unclassed <p>
            let location = locations
                .get(index)
                .and_then(|block| {
                    block
                        .select(&self.location_line)
                        .find(|p| p.value().attr("class").is_none())
                })
                .map(|p| p.text().collect::<Vec<_>>().join(" ").trim().to_string())
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "Location not found".to_string());

            suppliers.push(Supplier { name, location });
        }

        if suppliers.is_empty() {
            ExtractionResult::Empty
        } else {
            ExtractionResult::Data(SourcePayload::Suppliers(suppliers))
        }
    }
}
