//! Nutrition enrichment: one nutrition fetch per candidate, failures isolated.

use crate::domain::{Candidate, EnrichedCandidate, NutritionProfile};
use crate::ports::{IngredientCatalog, PortError, PortResult};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on concurrent nutrition fetches.
pub const MAX_CONCURRENT_FETCHES: usize = 10;

/// Fetches nutrition for every candidate and keeps the ones with a calorie value.
///
/// Fetches run with bounded concurrency but results come back in input order,
/// so downstream ranking stays deterministic. A failed or calorie-less
/// candidate is logged and dropped; it never fails the batch.
pub async fn enrich(
    catalog: &dyn IngredientCatalog,
    candidates: Vec<Candidate>,
    concurrency: usize,
    timeout: Duration,
) -> Vec<EnrichedCandidate> {
    let concurrency = concurrency.clamp(1, MAX_CONCURRENT_FETCHES);

    let outcomes: Vec<_> = stream::iter(candidates)
        .map(|candidate| enrich_one(catalog, candidate, timeout))
        .buffered(concurrency)
        .collect()
        .await;

    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Ok(enriched) => Some(enriched),
            Err((id, e)) => {
                warn!("Dropping ingredient {} from results: {}", id, e);
                None
            }
        })
        .collect()
}

async fn enrich_one(
    catalog: &dyn IngredientCatalog,
    candidate: Candidate,
    timeout: Duration,
) -> Result<EnrichedCandidate, (u64, PortError)> {
    let id = candidate.id;
    let profile = fetch_with_timeout(catalog, id, timeout)
        .await
        .map_err(|e| (id, e))?;

    match EnrichedCandidate::from_profile(candidate, profile) {
        Some(enriched) => {
            debug!("Ingredient {} has {} {}", id, enriched.calories, enriched.calorie_unit);
            Ok(enriched)
        }
        None => Err((
            id,
            PortError::Malformed("nutrition profile has no Calories entry".to_string()),
        )),
    }
}

async fn fetch_with_timeout(
    catalog: &dyn IngredientCatalog,
    id: u64,
    timeout: Duration,
) -> PortResult<NutritionProfile> {
    tokio::time::timeout(timeout, catalog.ingredient_nutrition(id))
        .await
        .map_err(|_| PortError::Timeout(format!("nutrition fetch for ingredient {}", id)))?
}
