//! crates/food_wizard_core/src/search.rs
//!
//! The ingredient discovery pipeline: validate, search the provider, enrich
//! each candidate with nutrition, then select the lowest-calorie results.
//! Persistence is left to the caller so it can run after the response.

use crate::domain::{Candidate, EnrichedCandidate, RecipeSuggestion, ValidQuery};
use crate::enrich::{enrich, MAX_CONCURRENT_FETCHES};
use crate::ports::{IngredientCatalog, PortError, RecipeFinder};
use crate::ranking::{select, DEFAULT_SELECTION};
use crate::validate::{validate, QueryRejection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Result count requested from the provider's search endpoint.
pub const SEARCH_RESULT_LIMIT: usize = 20;
/// Candidates that go on to the (per-item, billed) nutrition lookup.
pub const MAX_CANDIDATES: usize = 10;
/// Recipes requested per find-by-ingredient lookup.
pub const RECIPE_SUGGESTIONS: usize = 3;

//=========================================================================================
// Errors and Settings
//=========================================================================================

/// Request-level failures of a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),
    /// The provider search call failed or timed out; nothing was searched.
    #[error("Upstream search failed: {0}")]
    UpstreamSearch(PortError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub enrich_concurrency: usize,
    /// Bound applied to every provider call.
    pub upstream_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            enrich_concurrency: MAX_CONCURRENT_FETCHES,
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

//=========================================================================================
// Ingredient Search
//=========================================================================================

/// What a completed ingredient search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: ValidQuery,
    pub selection: Vec<EnrichedCandidate>,
}

#[derive(Clone)]
pub struct IngredientSearch {
    catalog: Arc<dyn IngredientCatalog>,
    settings: PipelineSettings,
}

impl IngredientSearch {
    pub fn new(catalog: Arc<dyn IngredientCatalog>, settings: PipelineSettings) -> Self {
        Self { catalog, settings }
    }

    /// Runs the whole pipeline for a raw query.
    ///
    /// Invalid input is rejected before any provider call.
    pub async fn search(&self, raw: Option<&str>) -> Result<SearchOutcome, SearchError> {
        let query = validate(raw)?;
        let candidates = self.find_candidates(&query).await?;
        if candidates.is_empty() {
            info!("No ingredients found for '{}'", query);
            return Ok(SearchOutcome {
                query,
                selection: Vec::new(),
            });
        }

        let considered = candidates.len();
        let enriched = enrich(
            self.catalog.as_ref(),
            candidates,
            self.settings.enrich_concurrency,
            self.settings.upstream_timeout,
        )
        .await;
        info!(
            "Enriched {} of {} ingredients for '{}'",
            enriched.len(),
            considered,
            query
        );

        Ok(SearchOutcome {
            selection: select(enriched, DEFAULT_SELECTION),
            query,
        })
    }

    /// Calls the provider search endpoint and caps the candidates kept.
    pub async fn find_candidates(&self, query: &ValidQuery) -> Result<Vec<Candidate>, SearchError> {
        let call = self
            .catalog
            .search_ingredients(query.as_str(), SEARCH_RESULT_LIMIT);
        let mut candidates = tokio::time::timeout(self.settings.upstream_timeout, call)
            .await
            .map_err(|_| PortError::Timeout(format!("ingredient search for '{}'", query)))
            .and_then(|r| r)
            .map_err(|e| {
                warn!("Ingredient search for '{}' failed: {}", query, e);
                SearchError::UpstreamSearch(e)
            })?;

        candidates.truncate(MAX_CANDIDATES);
        Ok(candidates)
    }

    /// Fetches the provider detail document for one ingredient.
    pub async fn details(&self, id: u64) -> Result<serde_json::Value, PortError> {
        tokio::time::timeout(self.settings.upstream_timeout, self.catalog.ingredient_details(id))
            .await
            .map_err(|_| PortError::Timeout(format!("details for ingredient {}", id)))?
    }
}

//=========================================================================================
// Recipe Suggestions
//=========================================================================================

#[derive(Debug, Clone)]
pub struct RecipeOutcome {
    pub ingredient: ValidQuery,
    pub recipes: Vec<RecipeSuggestion>,
}

#[derive(Clone)]
pub struct RecipeSearch {
    finder: Arc<dyn RecipeFinder>,
    timeout: Duration,
}

impl RecipeSearch {
    pub fn new(finder: Arc<dyn RecipeFinder>, timeout: Duration) -> Self {
        Self { finder, timeout }
    }

    pub async fn suggest(&self, raw: Option<&str>) -> Result<RecipeOutcome, SearchError> {
        let ingredient = validate(raw)?;
        let call = self
            .finder
            .recipes_by_ingredient(ingredient.as_str(), RECIPE_SUGGESTIONS);
        let mut recipes = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| PortError::Timeout(format!("recipe lookup for '{}'", ingredient)))
            .and_then(|r| r)
            .map_err(|e| {
                warn!("Recipe lookup for '{}' failed: {}", ingredient, e);
                SearchError::UpstreamSearch(e)
            })?;

        recipes.truncate(RECIPE_SUGGESTIONS);
        Ok(RecipeOutcome { ingredient, recipes })
    }
}
