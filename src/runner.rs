use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::extractors::{ExtractionResult, ExtractorSet};
use crate::fetcher::{FetchOutcome, RetryingFetcher};
use crate::identity::IdentityPool;
use crate::models::{SourceSpec, TaskOutcome, TaskStatus, Transport};
use crate::session::SessionManager;
use crate::utils::error::AppError;

/// Runs one source's pipeline: acquire an identity, fetch or navigate,
/// then extract. Every fault, from a refused connection to a captcha
/// wall, comes back as a `TaskOutcome`; nothing escapes past this boundary.
pub struct TaskRunner {
    identities: Arc<IdentityPool>,
    fetcher: Arc<RetryingFetcher>,
    sessions: Arc<SessionManager>,
    extractors: Arc<ExtractorSet>,
    navigation_timeout: Duration,
}

impl TaskRunner {
    pub fn new(
        identities: Arc<IdentityPool>,
        fetcher: Arc<RetryingFetcher>,
        sessions: Arc<SessionManager>,
        extractors: Arc<ExtractorSet>,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            identities,
            fetcher,
            sessions,
            extractors,
            navigation_timeout,
        }
    }

    pub async fn run(&self, spec: &SourceSpec, product_name: &str) -> TaskOutcome {
        let url = spec.search_url(product_name);
        let identity = self.identities.next();
        tracing::debug!(source = spec.id.as_str(), %url, "starting scrape task");

        let raw = match spec.transport {
            Transport::Fetch => match self.fetcher.fetch(&url, &identity).await {
                FetchOutcome::Ok(body) => body,
                FetchOutcome::RateLimited => {
                    return self.finish(TaskOutcome::warning(spec.id, "rate limited"));
                }
                FetchOutcome::Timeout => {
                    return self.finish(TaskOutcome::failure(spec.id, "timed out"));
                }
                FetchOutcome::Transport(reason) => {
                    return self.finish(TaskOutcome::failure(
                        spec.id,
                        format!("transport error: {}", reason),
                    ));
                }
            },
            Transport::Browser => {
                let wait_selector = spec.wait_selector.clone();
                let timeout = self.navigation_timeout;
                let target = url.clone();

                let session_result = self
                    .sessions
                    .with_session(&identity, move |page| {
                        page.navigate(&target)?;
                        if let Some(marker) = wait_selector.as_deref() {
                            // Marker wait is best-effort readiness: a result
                            // page with no listings never renders the marker,
                            // and the extractor decides what that means.
                            if page.wait_for(marker, timeout).is_err() {
                                tracing::debug!(marker, "marker element never appeared");
                            }
                        }
                        page.content()
                    })
                    .await;

                match session_result {
                    Ok(html) => html,
                    Err(AppError::SessionUnavailable(reason)) => {
                        return self.finish(TaskOutcome::failure(
                            spec.id,
                            format!("backend session could not start: {}", reason),
                        ));
                    }
                    Err(AppError::Timeout(reason)) => {
                        return self.finish(TaskOutcome::failure(
                            spec.id,
                            format!("timed out: {}", reason),
                        ));
                    }
                    Err(e) => {
                        return self.finish(TaskOutcome::failure(spec.id, e.to_string()));
                    }
                }
            }
        };

        let Some(extractor) = self.extractors.get(spec.id) else {
            return self.finish(TaskOutcome::failure(spec.id, "no extractor registered"));
        };

        let outcome = match extractor.extract(&raw) {
            ExtractionResult::Data(payload) => TaskOutcome::success(spec.id, payload),
            ExtractionResult::Empty => TaskOutcome::warning(spec.id, "no matching data"),
            ExtractionResult::ParseError(reason) => {
                TaskOutcome::failure(spec.id, format!("parse error: {}", reason))
            }
        };
        self.finish(outcome)
    }

    fn finish(&self, outcome: TaskOutcome) -> TaskOutcome {
        let status = match &outcome.status {
            TaskStatus::Success { .. } => "success",
            TaskStatus::Warning { .. } => "warning",
            TaskStatus::Failure { .. } => "failure",
        };
        counter!(
            "argus_tasks_total",
            "source" => outcome.source_id.as_str(),
            "status" => status
        )
        .increment(1);

        if let TaskStatus::Failure { reason } = &outcome.status {
            tracing::warn!(
                source = outcome.source_id.as_str(),
                %reason,
                "scrape task failed"
            );
        }
        outcome
    }
}
