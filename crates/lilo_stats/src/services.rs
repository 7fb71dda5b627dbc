use std::sync::Arc;

use lilo_client::LiloClient;
use lilo_client::retry::RetryPolicy;

use crate::error::StatsResult;
use crate::normalize::{Normalized, normalize_items};
use crate::report::{ReportOptions, Scope, StatsReport};

/// Fetch boundary: pulls raw items for a scope and hands them to the
/// pure aggregation functions.
#[derive(Clone)]
pub struct StatsService {
    client: Arc<dyn LiloClient>,
    retry: RetryPolicy,
}

impl StatsService {
    pub fn new(client: Arc<dyn LiloClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn client(&self) -> Arc<dyn LiloClient> {
        self.client.clone()
    }

    /// Fetch and normalize the records of `scope`.
    pub async fn fetch(&self, scope: &Scope) -> StatsResult<Normalized> {
        let query = scope.query();
        let client = self.client.clone();
        let items = self
            .retry
            .retry_transient(move || {
                let client = client.clone();
                let query = query.clone();
                async move { client.list_moods(&query).await }
            })
            .await
            .inspect_err(|e| tracing::warn!(%scope, error = %e, "mood fetch failed"))?;

        let normalized = normalize_items(&items);
        if normalized.dropped > 0 {
            tracing::info!(
                %scope,
                dropped = normalized.dropped,
                kept = normalized.records.len(),
                "dropped malformed mood items"
            );
        }
        Ok(normalized)
    }

    pub async fn report(&self, scope: &Scope, options: &ReportOptions) -> StatsResult<StatsReport> {
        let normalized = self.fetch(scope).await?;
        let report = StatsReport::build(&normalized, scope, options);
        tracing::debug!(%scope, days = report.daily.len(), records = report.record_count, "report built");
        Ok(report)
    }
}
