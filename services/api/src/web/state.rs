//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use food_wizard_core::{HistoryReader, IngredientSearch, PersistenceCoordinator, RecipeSearch};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The storage tiers are chosen here, at construction time; handlers never
/// swap them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ingredients: IngredientSearch,
    pub recipes: RecipeSearch,
    pub persistence: PersistenceCoordinator,
    pub history: HistoryReader,
}
