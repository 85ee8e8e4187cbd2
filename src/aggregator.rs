use chrono::Utc;

use crate::models::{
    CompetitorReport, CompositeReport, SourceId, SourceKind, TaskOutcome,
};

/// Combine per-source outcomes into the composite report. Pure with respect
/// to the outcomes: each section reflects exactly its own source's result,
/// whatever happened to the others.
pub fn compose(product_name: &str, outcomes: Vec<TaskOutcome>) -> CompositeReport {
    let mut demand = None;
    let mut suppliers = None;
    let mut competitors = Vec::new();

    for outcome in outcomes {
        match outcome.source_id.kind() {
            SourceKind::Demand => demand = Some(outcome),
            SourceKind::Suppliers => suppliers = Some(outcome),
            SourceKind::Competitor => competitors.push(outcome),
        }
    }

    let demand =
        demand.unwrap_or_else(|| TaskOutcome::failure(SourceId::Demand, "source not dispatched"));
    let suppliers = suppliers
        .unwrap_or_else(|| TaskOutcome::failure(SourceId::Suppliers, "source not dispatched"));

    CompositeReport {
        product_name: product_name.to_string(),
        demand,
        suppliers,
        competitors: summarize_competitors(competitors),
        generated_at: Utc::now(),
    }
}

/// Pool every accepted sample and average once, so a source with one
/// listing does not weigh as much as a source with five.
fn summarize_competitors(sources: Vec<TaskOutcome>) -> CompetitorReport {
    let samples: Vec<f64> = sources
        .iter()
        .filter_map(TaskOutcome::prices)
        .flatten()
        .copied()
        .collect();

    let sample_count = samples.len();
    let market_average = if sample_count == 0 {
        0.0
    } else {
        samples.iter().sum::<f64>() / sample_count as f64
    };

    let insight = if sample_count == 0 {
        "Could not determine an average market price.".to_string()
    } else {
        format!("Overall market average price is ~₹{:.2}.", market_average)
    };

    CompetitorReport {
        sources,
        market_average,
        sample_count,
        insight,
    }
}
