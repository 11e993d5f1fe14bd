//! Core types for attribution results and backend match events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The attributions found for one snippet, from a single source or merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetAttributions {
    /// Repository names in discovery order, without duplicates.
    ///
    /// Names from the local instance and from a federated corpus are mixed
    /// here, so a name may refer to a repository not present locally.
    pub repository_names: Vec<String>,
    /// Number of distinct repositories found before the search stopped.
    ///
    /// Counted under the bounded query, not across the whole corpus. When
    /// `limit_hit` is true the real number may be higher.
    pub total_count: usize,
    /// True if the search stopped before looking at the full corpus.
    pub limit_hit: bool,
}

/// Backend-assigned repository identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId(pub u64);

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single match reported by a backend, reduced to its repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMatch {
    pub repo_id: RepoId,
    pub repo_name: String,
}

/// One batch of matches streamed by a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchEvent {
    pub matches: Vec<RepoMatch>,
    /// The backend truncated its own search for this batch.
    pub limit_hit: bool,
}

/// Summary statistics returned when a backend finishes streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of events delivered to the sink.
    pub events: usize,
    /// Number of matches across all delivered events.
    pub matches: usize,
    /// Whether any delivered event reported truncation.
    pub limit_hit: bool,
}

/// How the backend interprets the query pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    /// Exact literal text match.
    Literal,
    /// Regular expression match.
    Regexp,
    /// Backend default syntax.
    Standard,
}

impl PatternType {
    /// Returns the wire name of this pattern type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Regexp => "regexp",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Search mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    /// Run the query exactly as written.
    Precise,
    /// Allow the backend to rewrite the query.
    Smart,
}

/// How results are delivered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Results are collected and delivered in batches.
    Batch,
    /// Results are streamed as they are found.
    Streaming,
}
