use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{SourceId, SourcePayload};

pub mod amazon;
pub mod demand;
pub mod flipkart;
pub mod meesho;
pub mod suppliers;

pub use amazon::AmazonExtractor;
pub use demand::DemandExtractor;
pub use flipkart::FlipkartExtractor;
pub use meesho::MeeshoExtractor;
pub use suppliers::SupplierExtractor;

/// Listings kept per source, matching what the result pages reliably render
/// above the fold.
pub const MAX_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Data(SourcePayload),
    /// Page loaded but held no matching data.
    Empty,
    ParseError(String),
}

/// One implementation per source. Must never panic past this boundary:
/// anything unparsable becomes `ParseError`, anything missing becomes
/// `Empty` or a sentinel field value.
pub trait Extractor: Send + Sync {
    fn source_id(&self) -> SourceId;
    fn extract(&self, raw: &str) -> ExtractionResult;
}

/// Maps each source to its extractor so the orchestration code stays
/// polymorphic; tests swap in fixture-driven implementations here.
pub struct ExtractorSet {
    extractors: HashMap<SourceId, Box<dyn Extractor>>,
}

impl ExtractorSet {
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(Box::new(DemandExtractor::new()));
        set.register(Box::new(SupplierExtractor::new()));
        set.register(Box::new(AmazonExtractor::new()));
        set.register(Box::new(FlipkartExtractor::new()));
        set.register(Box::new(MeeshoExtractor::new()));
        set
    }

    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.insert(extractor.source_id(), extractor);
    }

    pub fn get(&self, source_id: SourceId) -> Option<&dyn Extractor> {
        self.extractors.get(&source_id).map(|boxed| boxed.as_ref())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse cleaned price text into a sample value.
pub(crate) fn decimal_price(text: &str) -> Option<f64> {
    let trimmed = text.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .ok()
        .and_then(|price| price.to_f64())
        .filter(|price| price.is_finite() && *price > 0.0)
}
