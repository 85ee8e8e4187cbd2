use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SourceId;

/// Demand section payload: mean search interest over the trailing year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandSignal {
    pub average_interest: f64,
    pub insight: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub name: String,
    pub location: String,
    pub contact: String,
}

/// What a successful extraction produced for one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SourcePayload {
    Demand(DemandSignal),
    Suppliers(Vec<Supplier>),
    Prices(Vec<f64>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    Success { payload: SourcePayload },
    Warning { reason: String },
    Failure { reason: String },
}

/// Terminal, fault-converted result of scraping one source. Built once by
/// the task that owns it and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskOutcome {
    pub source_id: SourceId,
    #[serde(flatten)]
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn success(source_id: SourceId, payload: SourcePayload) -> Self {
        Self {
            source_id,
            status: TaskStatus::Success { payload },
        }
    }

    pub fn warning(source_id: SourceId, reason: impl Into<String>) -> Self {
        Self {
            source_id,
            status: TaskStatus::Warning {
                reason: reason.into(),
            },
        }
    }

    pub fn failure(source_id: SourceId, reason: impl Into<String>) -> Self {
        Self {
            source_id,
            status: TaskStatus::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Success { .. })
    }

    /// Price samples this outcome contributes to the market average, if any.
    pub fn prices(&self) -> Option<&[f64]> {
        match &self.status {
            TaskStatus::Success {
                payload: SourcePayload::Prices(prices),
            } => Some(prices),
            _ => None,
        }
    }
}

/// Competitor slice of the composite report: per-source outcomes plus the
/// statistics pooled across every accepted price sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorReport {
    pub sources: Vec<TaskOutcome>,
    pub market_average: f64,
    pub sample_count: usize,
    pub insight: String,
}

/// The full multi-source result for one product-name query. Read-only after
/// construction; nothing is kept between requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositeReport {
    pub product_name: String,
    pub demand: TaskOutcome,
    pub suppliers: TaskOutcome,
    pub competitors: CompetitorReport,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadReport {
    pub count: usize,
    pub leads: Vec<Lead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
