//! Core attribution orchestrator: concurrent fan-out, join, ordered merge.
//!
//! The local resolver always runs; the federated resolver runs only when
//! federation is enabled. Both share one cancellation scope derived from the
//! caller's token. The first failure cancels the scope, every task is
//! joined, and the failure is returned without a partial merge.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::config::AttributionConfig;
use crate::error::{AttributionError, Result};
use crate::resolver::{AttributionSource, FederatedResolver, LocalResolver, Source};
use crate::types::SnippetAttributions;

use super::merge::merge_attributions;

/// Answers snippet attribution requests across the local and federated corpora.
pub struct AttributionService<L, F = FederatedResolver> {
    local: Arc<L>,
    federated: Arc<F>,
    config: AttributionConfig,
}

impl<B: SearchBackend + 'static> AttributionService<LocalResolver<B>, FederatedResolver> {
    /// Build a service whose local corpus is served by `backend`.
    pub fn from_backend(backend: Arc<B>, config: AttributionConfig) -> Self {
        let federated = FederatedResolver::new(config.federated_endpoint.clone());
        Self::new(LocalResolver::new(backend), federated, config)
    }
}

impl<L, F> AttributionService<L, F>
where
    L: AttributionSource + 'static,
    F: AttributionSource + 'static,
{
    pub fn new(local: L, federated: F, config: AttributionConfig) -> Self {
        Self {
            local: Arc::new(local),
            federated: Arc::new(federated),
            config,
        }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Find the repositories matching `snippet`, local results first.
    ///
    /// # Errors
    ///
    /// Returns the first resolver error observed. Results from resolvers
    /// that did succeed are discarded.
    pub async fn snippet_attribution(&self, snippet: &str, limit: usize) -> Result<SnippetAttributions> {
        self.snippet_attribution_with_cancel(snippet, limit, &CancellationToken::new())
            .await
    }

    /// Like [`Self::snippet_attribution`], stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError::Cancelled`] if `cancel` fires first, or the
    /// first resolver error observed.
    pub async fn snippet_attribution_with_cancel(
        &self,
        snippet: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<SnippetAttributions> {
        if limit == 0 {
            return Err(AttributionError::Config(
                "limit must be greater than 0".into(),
            ));
        }

        let scope = cancel.child_token();
        let snippet: Arc<str> = Arc::from(snippet);
        let mut tasks = JoinSet::new();

        tasks.spawn(run_source(
            Source::Local,
            Arc::clone(&self.local),
            Arc::clone(&snippet),
            limit,
            scope.clone(),
        ));
        if self.config.federate {
            tasks.spawn(run_source(
                Source::Federated,
                Arc::clone(&self.federated),
                Arc::clone(&snippet),
                limit,
                scope.clone(),
            ));
        }

        // Filed by launch slot, not completion order, so local always merges first.
        let mut local: Option<SnippetAttributions> = None;
        let mut federated: Option<SnippetAttributions> = None;
        let mut first_err: Option<AttributionError> = None;

        while let Some(joined) = tasks.join_next().await {
            let (slot, outcome) = match joined {
                Ok(done) => done,
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "attribution task did not complete");
                    scope.cancel();
                    first_err.get_or_insert(AttributionError::Task(join_err.to_string()));
                    continue;
                }
            };
            match outcome {
                Ok(result) => match slot {
                    Source::Local => local = Some(result),
                    Source::Federated => federated = Some(result),
                },
                Err(err) => {
                    tracing::warn!(%slot, error = %err, "attribution source failed");
                    scope.cancel();
                    first_err.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_err {
            return Err(err);
        }
        let local = local.ok_or_else(|| {
            AttributionError::Task("local resolver finished without a result".into())
        })?;

        let merged = merge_attributions(std::iter::once(&local).chain(federated.as_ref()));
        tracing::debug!(
            repos = merged.repository_names.len(),
            total_count = merged.total_count,
            limit_hit = merged.limit_hit,
            federated = federated.is_some(),
            "snippet attribution merged"
        );
        Ok(merged)
    }
}

async fn run_source<S: AttributionSource>(
    slot: Source,
    source: Arc<S>,
    snippet: Arc<str>,
    limit: usize,
    scope: CancellationToken,
) -> (Source, Result<SnippetAttributions>) {
    let result = source.resolve(&snippet, limit, &scope).await;
    (slot, result)
}
