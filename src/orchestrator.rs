use futures::future::join_all;
use metrics::histogram;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::aggregator;
use crate::models::{CompositeReport, SourceId, SourceSpec, TaskOutcome};
use crate::runner::TaskRunner;
use crate::utils::error::{AppError, Result};

/// Fans one product query out into independent per-source scrape tasks and
/// fans their outcomes back into a composite report. A task's fault never
/// cancels its siblings and is never retried here; bounded retrying lives
/// in the fetcher.
pub struct Orchestrator {
    runner: Arc<TaskRunner>,
    sources: Vec<SourceSpec>,
    deadline: Option<Duration>,
}

impl Orchestrator {
    pub fn new(runner: Arc<TaskRunner>, sources: Vec<SourceSpec>, deadline: Option<Duration>) -> Self {
        Self {
            runner,
            sources,
            deadline,
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub async fn produce_report(&self, product_name: &str) -> Result<CompositeReport> {
        let product = product_name.trim();
        if product.is_empty() {
            return Err(AppError::Validation(
                "product name must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        tracing::info!(product, tasks = self.sources.len(), "dispatching scrape tasks");

        let handles: Vec<(SourceId, tokio::task::JoinHandle<TaskOutcome>)> = self
            .sources
            .iter()
            .map(|spec| {
                let runner = Arc::clone(&self.runner);
                let id = spec.id;
                let spec = spec.clone();
                let product = product.to_string();
                let handle = tokio::spawn(async move { runner.run(&spec, &product).await });
                (id, handle)
            })
            .collect();

        tracing::debug!("collecting task outcomes");
        let outcomes = match self.deadline {
            Some(deadline) => self.collect_with_deadline(handles, started + deadline).await,
            None => self.collect_all(handles).await,
        };

        let elapsed = started.elapsed();
        histogram!("argus_report_duration_seconds").record(elapsed.as_secs_f64());
        tracing::info!(product, elapsed_ms = elapsed.as_millis() as u64, "report complete");

        Ok(aggregator::compose(product, outcomes))
    }

    /// Join on "all complete": sibling order and speed are irrelevant, each
    /// slot in the result belongs to the source that produced it.
    async fn collect_all(
        &self,
        handles: Vec<(SourceId, tokio::task::JoinHandle<TaskOutcome>)>,
    ) -> Vec<TaskOutcome> {
        let (ids, joins): (Vec<_>, Vec<_>) = handles.into_iter().unzip();

        join_all(joins)
            .await
            .into_iter()
            .zip(ids)
            .map(|(joined, id)| Self::unwrap_join(id, joined))
            .collect()
    }

    /// Deadline variant: any task still pending at the cutoff is reported
    /// as failed and abandoned. The underlying fetch or navigation keeps
    /// running to completion on its own; aborting a browser mid-navigation
    /// is not safe.
    async fn collect_with_deadline(
        &self,
        handles: Vec<(SourceId, tokio::task::JoinHandle<TaskOutcome>)>,
        cutoff: Instant,
    ) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match tokio::time::timeout_at(cutoff, handle).await {
                Ok(joined) => Self::unwrap_join(id, joined),
                Err(_) => {
                    tracing::warn!(source = id.as_str(), "task abandoned at report deadline");
                    TaskOutcome::failure(id, "deadline exceeded")
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn unwrap_join(
        id: SourceId,
        joined: std::result::Result<TaskOutcome, tokio::task::JoinError>,
    ) -> TaskOutcome {
        match joined {
            Ok(outcome) => outcome,
            // A panicking task is still just one failed source
            Err(e) => TaskOutcome::failure(id, format!("task aborted: {}", e)),
        }
    }
}
