//! In-memory backend over a fixed repository corpus.
//!
//! Matches are exact substring hits against file contents. Useful for local
//! tooling and tests; it has no index and no persistence.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::backend::{EventSink, QueryPlan, SearchBackend};
use crate::error::{AttributionError, BackendError};
use crate::query::{parse_attribution_query, QueryRequest, QUERY_VERSION};
use crate::types::{PatternType, RepoId, RepoMatch, SearchEvent, SearchStats};

/// One repository in a [`MemoryBackend`] corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRepo {
    pub id: u64,
    pub name: String,
    /// File contents searched for the snippet.
    #[serde(default)]
    pub files: Vec<String>,
}

impl MemoryRepo {
    pub fn new(id: u64, name: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            files,
        }
    }
}

/// A [`SearchBackend`] over repositories held in memory.
///
/// The corpus is split across `producers` shards that deliver events
/// concurrently, so sinks see interleaved batches the way they would from a
/// sharded index.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    repos: Vec<MemoryRepo>,
    producers: usize,
}

impl MemoryBackend {
    pub fn new(repos: Vec<MemoryRepo>) -> Self {
        Self {
            repos,
            producers: 1,
        }
    }

    /// Deliver events from `producers` concurrent shards (at least one).
    pub fn with_producers(mut self, producers: usize) -> Self {
        self.producers = producers.max(1);
        self
    }

    /// Load a corpus from a JSON array of [`MemoryRepo`] values.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError::Io`] if the file cannot be read, or
    /// [`AttributionError::Config`] if it is not a valid corpus.
    pub fn from_json_file(path: &Path) -> Result<Self, AttributionError> {
        let content = std::fs::read_to_string(path)?;
        let repos: Vec<MemoryRepo> = serde_json::from_str(&content)
            .map_err(|e| AttributionError::Config(format!("invalid corpus: {e}")))?;
        Ok(Self::new(repos))
    }

    pub fn repos(&self) -> &[MemoryRepo] {
        &self.repos
    }

    fn shards(&self) -> Vec<&[MemoryRepo]> {
        if self.repos.is_empty() {
            return Vec::new();
        }
        let size = self.repos.len().div_ceil(self.producers);
        self.repos.chunks(size).collect()
    }
}

/// Shared between shards: which repositories have been reported so far.
struct Reported {
    repos: HashSet<RepoId>,
    stats: SearchStats,
    capped: bool,
}

impl SearchBackend for MemoryBackend {
    async fn plan(&self, request: &QueryRequest) -> Result<QueryPlan, BackendError> {
        if request.version != QUERY_VERSION {
            return Err(BackendError::InvalidQuery(format!(
                "unsupported query version `{}`",
                request.version
            )));
        }
        if request.pattern_type != PatternType::Literal {
            return Err(BackendError::InvalidQuery(format!(
                "pattern type `{}` is not supported",
                request.pattern_type
            )));
        }
        let parsed = parse_attribution_query(&request.query)?;
        Ok(QueryPlan {
            request: request.clone(),
            pattern: parsed.content,
            result_cap: parsed.count,
        })
    }

    async fn execute(
        &self,
        plan: &QueryPlan,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<SearchStats, BackendError> {
        let reported = Mutex::new(Reported {
            repos: HashSet::new(),
            stats: SearchStats::default(),
            capped: false,
        });

        let producers = self.shards().into_iter().map(|shard| {
            let reported = &reported;
            async move {
                for repo in shard {
                    tokio::task::yield_now().await;
                    if cancel.is_cancelled() {
                        return Err(BackendError::Cancelled);
                    }
                    let hits = repo
                        .files
                        .iter()
                        .filter(|file| file.contains(plan.pattern.as_str()))
                        .count();
                    if hits == 0 {
                        continue;
                    }

                    let repo_id = RepoId(repo.id);
                    let mut state = reported.lock().unwrap_or_else(|e| e.into_inner());
                    if state.capped {
                        return Ok(());
                    }
                    if !state.repos.contains(&repo_id)
                        && state.repos.len() >= plan.result_cap
                    {
                        state.capped = true;
                        state.stats.events += 1;
                        state.stats.limit_hit = true;
                        sink.send(SearchEvent {
                            matches: Vec::new(),
                            limit_hit: true,
                        });
                        return Ok(());
                    }
                    state.repos.insert(repo_id);
                    // One event per matching file.
                    for _ in 0..hits {
                        state.stats.events += 1;
                        state.stats.matches += 1;
                        sink.send(SearchEvent {
                            matches: vec![RepoMatch {
                                repo_id,
                                repo_name: repo.name.clone(),
                            }],
                            limit_hit: false,
                        });
                    }
                }
                Ok(())
            }
        });

        for outcome in futures::future::join_all(producers).await {
            outcome?;
        }

        let state = reported.into_inner().unwrap_or_else(|e| e.into_inner());
        tracing::trace!(
            events = state.stats.events,
            matches = state.stats.matches,
            limit_hit = state.stats.limit_hit,
            "memory backend finished"
        );
        Ok(state.stats)
    }
}
