//! crates/food_wizard_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! pipeline independent of the ingredient provider and of the storage engines.

use crate::domain::{Candidate, NutritionProfile, RecipeSuggestion, SearchRecord, StoredSearch};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Operation timed out: {0}")]
    Timeout(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote ingredient search and detail API.
#[async_trait]
pub trait IngredientCatalog: Send + Sync {
    /// Searches ingredients by free text, asking for at most `limit` results.
    async fn search_ingredients(&self, query: &str, limit: usize) -> PortResult<Vec<Candidate>>;

    /// Fetches per-serving nutrition for one ingredient.
    async fn ingredient_nutrition(&self, id: u64) -> PortResult<NutritionProfile>;

    /// Fetches the full provider detail document for one ingredient.
    async fn ingredient_details(&self, id: u64) -> PortResult<serde_json::Value>;
}

#[async_trait]
pub trait RecipeFinder: Send + Sync {
    /// Suggests up to `limit` recipes that use the given ingredient.
    async fn recipes_by_ingredient(
        &self,
        ingredient: &str,
        limit: usize,
    ) -> PortResult<Vec<RecipeSuggestion>>;
}

/// One storage tier for search records.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    async fn create(&self, record: &SearchRecord) -> PortResult<()>;

    /// Returns up to `limit` records, newest first where the store can sort.
    /// Stores without query capability return everything they hold.
    async fn find_recent(&self, limit: usize) -> PortResult<Vec<StoredSearch>>;
}
