//! Integration tests for the attribution pipeline.
//!
//! These tests drive the public API end to end: query construction, a
//! concurrent in-memory backend, the local resolver's streaming reduction,
//! and the ordered merge with a federated source. No network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use snippet_attribution::backends::{MemoryBackend, MemoryRepo};
use snippet_attribution::query::{parse_attribution_query, QueryRequest};
use snippet_attribution::{
    AttributionConfig, AttributionError, AttributionService, AttributionSource, BackendError,
    EventSink, LocalResolver, QueryPlan, RepoId, RepoMatch, Result, SearchBackend, SearchEvent,
    SearchStats, SnippetAttributions,
};
use tokio_util::sync::CancellationToken;

const SNIPPET: &str = "for (i = 0; i < n; i++) { sum += a[i]; }";

fn corpus() -> Vec<MemoryRepo> {
    let hit = format!("int total(int *a, int n) {{ int sum = 0; {SNIPPET} return sum; }}");
    vec![
        MemoryRepo::new(10, "github.com/c/alpha", vec![hit.clone()]),
        MemoryRepo::new(11, "github.com/c/beta", vec!["unrelated".into()]),
        MemoryRepo::new(12, "github.com/c/gamma", vec![hit.clone(), hit.clone()]),
        MemoryRepo::new(13, "github.com/c/delta", vec![hit.clone()]),
        MemoryRepo::new(14, "github.com/c/epsilon", vec![hit]),
    ]
}

fn config(federate: bool) -> AttributionConfig {
    AttributionConfig {
        federate,
        ..Default::default()
    }
}

/// A federated stand-in that answers with a fixed list of names.
struct FixedRemote {
    names: Vec<&'static str>,
    total_count: usize,
    limit_hit: bool,
}

impl AttributionSource for FixedRemote {
    async fn resolve(
        &self,
        _snippet: &str,
        _limit: usize,
        _cancel: &CancellationToken,
    ) -> Result<SnippetAttributions> {
        Ok(SnippetAttributions {
            repository_names: self.names.iter().map(|n| n.to_string()).collect(),
            total_count: self.total_count,
            limit_hit: self.limit_hit,
        })
    }
}

/// Delivers a fixed event script from several concurrent producers.
struct ParallelScriptBackend {
    producers: Vec<Vec<SearchEvent>>,
    executions: AtomicUsize,
}

impl SearchBackend for ParallelScriptBackend {
    async fn plan(&self, request: &QueryRequest) -> std::result::Result<QueryPlan, BackendError> {
        let parsed = parse_attribution_query(&request.query)?;
        Ok(QueryPlan {
            request: request.clone(),
            pattern: parsed.content,
            result_cap: parsed.count,
        })
    }

    async fn execute(
        &self,
        _plan: &QueryPlan,
        sink: &dyn EventSink,
        _cancel: &CancellationToken,
    ) -> std::result::Result<SearchStats, BackendError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        std::thread::scope(|s| {
            for script in &self.producers {
                s.spawn(move || {
                    for event in script {
                        sink.send(event.clone());
                    }
                });
            }
        });
        Ok(SearchStats::default())
    }
}

/// Fails every execution.
struct BrokenBackend;

impl SearchBackend for BrokenBackend {
    async fn plan(&self, request: &QueryRequest) -> std::result::Result<QueryPlan, BackendError> {
        Ok(QueryPlan {
            request: request.clone(),
            pattern: String::new(),
            result_cap: 1,
        })
    }

    async fn execute(
        &self,
        _plan: &QueryPlan,
        _sink: &dyn EventSink,
        _cancel: &CancellationToken,
    ) -> std::result::Result<SearchStats, BackendError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err(BackendError::Unavailable("shard 3 unreachable".into()))
    }
}

#[tokio::test]
async fn local_only_attribution_over_memory_corpus() {
    let service = AttributionService::from_backend(Arc::new(MemoryBackend::new(corpus())), config(false));
    let found = service.snippet_attribution(SNIPPET, 10).await.expect("attribution");
    assert_eq!(
        found.repository_names,
        vec![
            "github.com/c/alpha",
            "github.com/c/gamma",
            "github.com/c/delta",
            "github.com/c/epsilon",
        ]
    );
    assert_eq!(found.total_count, 4);
    assert!(!found.limit_hit);
}

#[tokio::test]
async fn limit_two_truncates_and_flags_limit_hit() {
    let service = AttributionService::from_backend(Arc::new(MemoryBackend::new(corpus())), config(false));
    let found = service.snippet_attribution(SNIPPET, 2).await.expect("attribution");
    assert!(found.repository_names.len() <= 2);
    assert_eq!(found.repository_names, vec!["github.com/c/alpha", "github.com/c/gamma"]);
    assert!(found.limit_hit);
}

#[tokio::test]
async fn concurrent_memory_producers_yield_unique_names() {
    let backend = MemoryBackend::new(corpus()).with_producers(4);
    let service = AttributionService::from_backend(Arc::new(backend), config(false));
    let found = service.snippet_attribution(SNIPPET, 10).await.expect("attribution");
    let mut sorted = found.repository_names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), found.repository_names.len());
    assert_eq!(found.total_count, 4);
}

#[tokio::test]
async fn federated_results_follow_local_and_are_deduplicated() {
    let local = LocalResolver::new(Arc::new(MemoryBackend::new(corpus())));
    let remote = FixedRemote {
        names: vec!["github.com/c/gamma", "github.com/z/remote-only"],
        total_count: 2,
        limit_hit: true,
    };
    let service = AttributionService::new(local, remote, config(true));
    let found = service.snippet_attribution(SNIPPET, 10).await.expect("attribution");
    assert_eq!(
        found.repository_names,
        vec![
            "github.com/c/alpha",
            "github.com/c/gamma",
            "github.com/c/delta",
            "github.com/c/epsilon",
            "github.com/z/remote-only",
        ]
    );
    assert_eq!(found.total_count, 5);
    assert!(found.limit_hit);
}

#[tokio::test]
async fn stub_federation_matches_disabled_federation() {
    let backend = Arc::new(MemoryBackend::new(corpus()));
    let on = AttributionService::from_backend(Arc::clone(&backend), config(true));
    let off = AttributionService::from_backend(backend, config(false));
    assert_eq!(
        on.snippet_attribution(SNIPPET, 3).await.expect("federated"),
        off.snippet_attribution(SNIPPET, 3).await.expect("local only")
    );
}

#[tokio::test]
async fn threaded_producers_are_reduced_by_repo_id() {
    let m = |id: u64| RepoMatch {
        repo_id: RepoId(id),
        repo_name: format!("repo-{id}"),
    };
    let backend = ParallelScriptBackend {
        producers: (0..8)
            .map(|p| {
                (0..50)
                    .map(|i| SearchEvent {
                        matches: vec![m(i % 20), m((i + p) % 20)],
                        limit_hit: p == 3 && i == 49,
                    })
                    .collect()
            })
            .collect(),
        executions: AtomicUsize::new(0),
    };
    let backend = Arc::new(backend);
    let resolver = LocalResolver::new(Arc::clone(&backend));
    let found = resolver
        .resolve("x", 20, &CancellationToken::new())
        .await
        .expect("resolve");
    assert_eq!(found.total_count, 20);
    assert_eq!(found.repository_names.len(), 20);
    assert!(found.limit_hit);
    assert_eq!(backend.executions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_failure_fails_the_whole_request() {
    let local = LocalResolver::new(Arc::new(BrokenBackend));
    let remote = FixedRemote {
        names: vec!["github.com/z/remote-only"],
        total_count: 1,
        limit_hit: false,
    };
    let service = AttributionService::new(local, remote, config(true));
    let err = service.snippet_attribution(SNIPPET, 5).await.unwrap_err();
    assert!(matches!(err, AttributionError::Execute(_)));
    assert_eq!(
        err.to_string(),
        "failed to execute search: backend unavailable: shard 3 unreachable"
    );
}

#[tokio::test]
async fn snippet_with_query_syntax_is_matched_literally() {
    let tricky = r#"content:"x" OR repo:^evil$ \n"#;
    let backend = MemoryBackend::new(vec![
        MemoryRepo::new(1, "github.com/t/literal", vec![format!("s := `{tricky}`")]),
        MemoryRepo::new(2, "github.com/t/partial", vec!["content:\"x\" OR".into()]),
    ]);
    let service = AttributionService::from_backend(Arc::new(backend), config(false));
    let found = service.snippet_attribution(tricky, 5).await.expect("attribution");
    assert_eq!(found.repository_names, vec!["github.com/t/literal"]);
}

#[tokio::test]
async fn no_match_is_an_empty_success() {
    let service = AttributionService::from_backend(Arc::new(MemoryBackend::new(corpus())), config(true));
    let found = service
        .snippet_attribution("this text appears nowhere", 5)
        .await
        .expect("attribution");
    assert_eq!(found, SnippetAttributions::default());
}
