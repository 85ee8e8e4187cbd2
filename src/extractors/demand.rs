use serde_json::Value;

use crate::extractors::{ExtractionResult, Extractor};
use crate::models::{DemandSignal, SourceId, SourcePayload};

const HIGH_INTEREST: f64 = 60.0;
const MODERATE_INTEREST: f64 = 25.0;

/// Parses the trends interest-over-time payload into a demand signal. The
/// endpoint prefixes its JSON with an anti-hijacking garbage line, so
/// parsing starts at the first object brace.
pub struct DemandExtractor;

impl DemandExtractor {
    pub fn new() -> Self {
        Self
    }

    fn insight(average: f64) -> &'static str {
        if average > HIGH_INTEREST {
            "High and consistent search interest."
        } else if average > MODERATE_INTEREST {
            "Moderate search interest."
        } else {
            "Low search interest."
        }
    }
}

impl Default for DemandExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DemandExtractor {
    fn source_id(&self) -> SourceId {
        SourceId::Demand
    }

    fn extract(&self, raw: &str) -> ExtractionResult {
        let Some(start) = raw.find('{') else {
            return ExtractionResult::ParseError("no JSON object in response".to_string());
        };

        let value: Value = match serde_json::from_str(&raw[start..]) {
            Ok(value) => value,
            Err(e) => return ExtractionResult::ParseError(format!("invalid JSON: {}", e)),
        };

        let points = value
            .pointer("/default/timelineData")
            .and_then(Value::as_array);
        let Some(points) = points else {
            return ExtractionResult::Empty;
        };

        let interests: Vec<f64> = points
            .iter()
            .filter_map(|point| point.pointer("/value/0").and_then(Value::as_f64))
            .collect();

        if interests.is_empty() {
            return ExtractionResult::Empty;
        }

        let average = interests.iter().sum::<f64>() / interests.len() as f64;
        let average = (average * 100.0).round() / 100.0;

        ExtractionResult::Data(SourcePayload::Demand(DemandSignal {
            average_interest: average,
            insight: Self::insight(average).to_string(),
        }))
    }
}
