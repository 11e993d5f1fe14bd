//! # snippet-attribution
//!
//! Find which repositories contain a given code snippet.
//!
//! A snippet is searched for as an exact literal in the local instance's
//! indexed code and, when federation is enabled, in an independent remote
//! corpus. Both searches run concurrently; their answers are merged into one
//! deduplicated, bounded result with local repositories first.
//!
//! ## Design
//!
//! - The search engine is an injected [`SearchBackend`] behind a plan/execute
//!   contract; this crate never talks to an index directly
//! - Backends stream match batches that are reduced by repository id under a
//!   mutex, so producers may deliver concurrently
//! - The first resolver failure cancels its sibling; no partial result is
//!   ever returned
//! - Nothing is cached or persisted between requests
//!
//! ## Limitations
//!
//! Snippets are `&str`, so they must be valid UTF-8. Arbitrary byte
//! sequences (for example a file in a legacy encoding) have to be decoded
//! by the caller first; the command-line tool rejects non-UTF-8 input on
//! stdin.
//!
//! ## Privacy
//!
//! Snippet text is never logged or included in error messages; only its
//! length is recorded at trace level.

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod query;
pub mod resolver;
pub mod types;

use std::sync::Arc;

pub use backend::{EventSink, QueryPlan, SearchBackend};
pub use config::AttributionConfig;
pub use error::{AttributionError, BackendError, Result};
pub use orchestrator::AttributionService;
pub use resolver::{AttributionSource, FederatedResolver, LocalResolver, Source};
pub use types::{RepoId, RepoMatch, SearchEvent, SearchStats, SnippetAttributions};

/// Attribute `snippet` using `backend` for the local corpus.
///
/// Builds an [`AttributionService`] from `config` and runs a single request,
/// reporting at most `limit` repositories per source.
///
/// # Errors
///
/// Returns [`AttributionError::Config`] if `config` is invalid or `limit` is
/// zero, or the first error raised by a resolver.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> snippet_attribution::Result<()> {
/// use std::sync::Arc;
/// use snippet_attribution::backends::{MemoryBackend, MemoryRepo};
///
/// let backend = Arc::new(MemoryBackend::new(vec![MemoryRepo::new(
///     1,
///     "github.com/acme/widgets",
///     vec!["fn widget() -> u32 { 42 }".into()],
/// )]));
/// let config = snippet_attribution::AttributionConfig::default();
/// let found = snippet_attribution::snippet_attribution(backend, &config, "-> u32 { 42 }", 5).await?;
/// println!("{} repositories", found.total_count);
/// # Ok(())
/// # }
/// ```
pub async fn snippet_attribution<B: SearchBackend + 'static>(
    backend: Arc<B>,
    config: &AttributionConfig,
    snippet: &str,
    limit: usize,
) -> Result<SnippetAttributions> {
    config.validate()?;
    AttributionService::from_backend(backend, config.clone())
        .snippet_attribution(snippet, limit)
        .await
}

/// Attribute `snippet` with the configured default limit.
///
/// # Errors
///
/// Same as [`snippet_attribution`].
pub async fn snippet_attribution_default<B: SearchBackend + 'static>(
    backend: Arc<B>,
    config: &AttributionConfig,
    snippet: &str,
) -> Result<SnippetAttributions> {
    snippet_attribution(backend, config, snippet, config.default_limit).await
}
