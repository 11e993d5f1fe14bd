//! Attribution against a federated remote corpus.
//!
//! The remote search is not wired up yet: every resolution succeeds with an
//! empty answer, which callers cannot tell apart from "no matches".

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::SnippetAttributions;

use super::{AttributionSource, Source};

/// Resolver for the optional federated corpus.
#[derive(Debug, Clone, Default)]
pub struct FederatedResolver {
    endpoint: Option<String>,
}

impl FederatedResolver {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }

    /// The remote endpoint this resolver would query, if configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl AttributionSource for FederatedResolver {
    async fn resolve(
        &self,
        snippet: &str,
        limit: usize,
        _cancel: &CancellationToken,
    ) -> Result<SnippetAttributions> {
        tracing::debug!(
            source = %Source::Federated,
            endpoint = self.endpoint().unwrap_or("<default>"),
            snippet_len = snippet.len(),
            limit,
            "federated attribution returns no results"
        );
        Ok(SnippetAttributions::default())
    }
}
