//! Attribution resolvers: one per searchable corpus.
//!
//! A resolver turns a snippet and a limit into a single
//! [`SnippetAttributions`] for its corpus. The orchestrator runs several of
//! them concurrently and merges their answers.

pub mod federated;
pub mod local;

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::SnippetAttributions;

pub use federated::FederatedResolver;
pub use local::LocalResolver;

/// The slot a resolver was launched in by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The instance's own indexed code.
    Local,
    /// An independent remote corpus.
    Federated,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Federated => "federated",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves snippet attributions against one corpus.
pub trait AttributionSource: Send + Sync {
    /// Find the repositories whose content matches `snippet`, reporting at
    /// most `limit` names.
    ///
    /// Implementations must stop promptly with
    /// [`crate::AttributionError::Cancelled`] once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AttributionError`] if the corpus cannot be searched.
    /// No partial result is returned on error.
    fn resolve(
        &self,
        snippet: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<SnippetAttributions>> + Send;
}
