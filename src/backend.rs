//! Trait definition for pluggable code search backends.
//!
//! The attribution core never talks to an index directly. It plans a
//! structured [`QueryRequest`] and executes the resulting [`QueryPlan`],
//! receiving match batches through an [`EventSink`].

use tokio_util::sync::CancellationToken;

use crate::error::BackendError;
use crate::query::QueryRequest;
use crate::types::{SearchEvent, SearchStats};

/// A validated query, ready for [`SearchBackend::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// The request this plan was built from.
    pub request: QueryRequest,
    /// Pattern extracted during planning.
    pub pattern: String,
    /// Maximum number of repositories the backend should report.
    pub result_cap: usize,
}

/// Receives match events from a backend.
///
/// Backends may call [`EventSink::send`] from several producers at once, so
/// implementations must synchronise their own state.
pub trait EventSink: Send + Sync {
    fn send(&self, event: SearchEvent);
}

impl<F> EventSink for F
where
    F: Fn(SearchEvent) + Send + Sync,
{
    fn send(&self, event: SearchEvent) {
        self(event)
    }
}

/// A code search backend reachable through a plan/execute contract.
///
/// All implementations must be `Send + Sync` so resolvers can share them
/// across concurrently running tasks.
pub trait SearchBackend: Send + Sync {
    /// Validate `request` and build an executable plan.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the query cannot be parsed or is not
    /// supported by this backend.
    fn plan(
        &self,
        request: &QueryRequest,
    ) -> impl std::future::Future<Output = Result<QueryPlan, BackendError>> + Send;

    /// Run `plan`, delivering every batch of matches to `sink`.
    ///
    /// Implementations should check `cancel` between batches and stop with
    /// [`BackendError::Cancelled`] once it fires.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if streaming fails part way through.
    fn execute(
        &self,
        plan: &QueryPlan,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<SearchStats, BackendError>> + Send;
}
