//! Attribution against the local instance's indexed code.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::error::{AttributionError, BackendError, Result};
use crate::query::QueryRequest;
use crate::types::{RepoId, SearchEvent, SnippetAttributions};

use super::AttributionSource;

/// Resolves attributions by running a literal, repo-scoped, index-only
/// query against a [`SearchBackend`].
pub struct LocalResolver<B> {
    backend: Arc<B>,
}

impl<B> LocalResolver<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

/// Reduction state shared by every event producer for one resolution.
///
/// Repositories are deduplicated by id; the first occurrence fixes the
/// position so ordering follows the backend's ranking.
#[derive(Debug, Default)]
struct Accumulator {
    seen: HashSet<RepoId>,
    repo_names: Vec<String>,
    limit_hit: bool,
}

impl Accumulator {
    fn observe(&mut self, event: SearchEvent) {
        self.limit_hit = self.limit_hit || event.limit_hit;
        for m in event.matches {
            if self.seen.insert(m.repo_id) {
                self.repo_names.push(m.repo_name);
            }
        }
    }

    fn finish(self, limit: usize) -> SnippetAttributions {
        // The backend has no corpus-wide total, so count what was found.
        let total_count = self.repo_names.len();
        let mut repository_names = self.repo_names;
        repository_names.truncate(limit);
        SnippetAttributions {
            repository_names,
            total_count,
            limit_hit: self.limit_hit,
        }
    }
}

impl<B: SearchBackend> AttributionSource for LocalResolver<B> {
    async fn resolve(
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
        tracing::trace!(snippet_len = snippet.len(), limit, "resolving attribution");

        let request = QueryRequest::attribution(snippet, limit);
        let plan = tokio::select! {
            plan = self.backend.plan(&request) => plan.map_err(AttributionError::Plan)?,
            _ = cancel.cancelled() => return Err(AttributionError::Cancelled),
        };

        let acc = Mutex::new(Accumulator::default());
        let sink = |event: SearchEvent| {
            acc.lock().unwrap_or_else(|e| e.into_inner()).observe(event);
        };

        let executed = tokio::select! {
            res = self.backend.execute(&plan, &sink, cancel) => res,
            _ = cancel.cancelled() => return Err(AttributionError::Cancelled),
        };
        match executed {
            Ok(stats) => {
                tracing::trace!(events = stats.events, matches = stats.matches, "backend search finished");
            }
            Err(BackendError::Cancelled) => return Err(AttributionError::Cancelled),
            Err(err) => return Err(AttributionError::Execute(err)),
        }

        let acc = acc.into_inner().unwrap_or_else(|e| e.into_inner());
        let result = acc.finish(limit);
        tracing::debug!(
            repos = result.total_count,
            limit_hit = result.limit_hit,
            "backend attribution resolved"
        );
        Ok(result)
    }
}
