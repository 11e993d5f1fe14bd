//! Attribution orchestrator: concurrent resolvers, ordered merge.
//!
//! This module fans a snippet out to the local and (optionally) federated
//! resolvers under one cancellation scope, waits for both, and merges their
//! answers local-first into a single deduplicated result.

pub mod aggregate;
pub mod merge;

pub use aggregate::AttributionService;
pub use merge::merge_attributions;
