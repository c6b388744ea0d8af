//! Ranking and selection of enriched candidates.

use crate::domain::EnrichedCandidate;

/// How many of the lowest-calorie candidates a search returns.
pub const DEFAULT_SELECTION: usize = 3;

/// Orders by ascending calories and keeps the first `n`.
///
/// The sort is stable, so candidates with equal calories keep their original order.
pub fn select(mut enriched: Vec<EnrichedCandidate>, n: usize) -> Vec<EnrichedCandidate> {
    enriched.sort_by(|a, b| a.calories.total_cmp(&b.calories));
    enriched.truncate(n);
    enriched
}
