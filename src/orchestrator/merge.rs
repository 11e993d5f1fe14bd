//! Merging per-source attributions into one answer.
//!
//! Sources are merged in the order given, never in completion order, so the
//! merged name list is deterministic.

use std::collections::HashSet;

use crate::types::SnippetAttributions;

/// Merge source results in order, deduplicating repository names.
///
/// Each source's `total_count` is added up front; a name already seen from
/// an earlier source undoes one of those increments. A source whose
/// `total_count` already exceeds its own name list keeps that excess in the
/// merged total.
pub fn merge_attributions<'a, I>(sources: I) -> SnippetAttributions
where
    I: IntoIterator<Item = &'a SnippetAttributions>,
{
    let mut merged = SnippetAttributions::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for result in sources {
        // May overcount when both sources know the same repository; undone below.
        merged.total_count += result.total_count;
        merged.limit_hit = merged.limit_hit || result.limit_hit;
        for name in &result.repository_names {
            if !seen.insert(name.as_str()) {
                merged.total_count = merged.total_count.saturating_sub(1);
                continue;
            }
            merged.repository_names.push(name.clone());
        }
    }

    merged
}
