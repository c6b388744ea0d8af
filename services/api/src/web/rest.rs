//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use food_wizard_core::history::DEFAULT_HISTORY_LIMIT;
use food_wizard_core::{
    EnrichedCandidate, HistoryEntry, QueryTag, RecipeSuggestion, SearchError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::{OpenApi, ToSchema};

/// Largest history page a caller may ask for.
pub const MAX_HISTORY_LIMIT: usize = 100;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        search_ingredients_handler,
        ingredient_details_handler,
        recipes_by_ingredient_handler,
        history_handler,
    ),
    components(
        schemas(HealthResponse, SearchResponse, RecipesResponse, ErrorResponse)
    ),
    tags(
        (name = "Food Wizard API", description = "Low-calorie ingredient discovery and search history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub environment: String,
}

/// The lowest-calorie matches for a query, ascending by calories.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    #[schema(value_type = Vec<Object>)]
    pub selection: Vec<EnrichedCandidate>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RecipesResponse {
    #[schema(value_type = Vec<Object>)]
    pub recipes: Vec<RecipeSuggestion>,
}

/// The body of every failed request. Messages are coarse on purpose.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn failure(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn search_failure(e: SearchError, upstream_message: &str) -> HandlerError {
    match e {
        SearchError::InvalidQuery(rejection) => {
            debug!("Rejected query: {}", rejection);
            failure(StatusCode::BAD_REQUEST, rejection.to_string())
        }
        SearchError::UpstreamSearch(_) => failure(StatusCode::BAD_GATEWAY, upstream_message),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Server health check.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Server is running", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
        environment: state.config.environment.clone(),
    })
}

/// Find the three lowest-calorie ingredients matching a query.
///
/// The search is recorded in the background once the selection is known;
/// storage problems never change the response.
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(
        ("query" = String, Query, description = "Free-text ingredient query, 1 to 100 characters.")
    ),
    responses(
        (status = 200, description = "Selection computed", body = SearchResponse),
        (status = 400, description = "Missing, blank or too long query", body = ErrorResponse),
        (status = 502, description = "Ingredient provider search failed", body = ErrorResponse)
    )
)]
pub async fn search_ingredients_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, HandlerError> {
    let outcome = state
        .ingredients
        .search(params.query.as_deref())
        .await
        .map_err(|e| search_failure(e, "Failed to fetch Food Data"))?;

    let persistence = state.persistence.clone();
    let query = outcome.query.clone();
    let snapshot = outcome.selection.clone();
    tokio::spawn(async move {
        persistence
            .persist(QueryTag::Ingredient, query.as_str(), &snapshot)
            .await;
    });

    Ok(Json(SearchResponse {
        selection: outcome.selection,
    }))
}

/// Full provider details for one ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/details/{id}",
    params(("id" = u64, Path, description = "Positive provider ingredient id.")),
    responses(
        (status = 200, description = "Provider detail document"),
        (status = 400, description = "Invalid ingredient id", body = ErrorResponse),
        (status = 502, description = "Provider lookup failed", body = ErrorResponse)
    )
)]
pub async fn ingredient_details_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let id = id
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Invalid Ingredient ID"))?;

    state.ingredients.details(id).await.map(Json).map_err(|e| {
        error!("Error fetching food details for {}: {}", id, e);
        failure(StatusCode::BAD_GATEWAY, "Failed to fetch Food Details")
    })
}

/// Recipe suggestions that use an ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/recipes/by-ingredient/{ingredient}",
    params(("ingredient" = String, Path, description = "Ingredient name, 1 to 100 characters.")),
    responses(
        (status = 200, description = "Recipe suggestions", body = RecipesResponse),
        (status = 400, description = "Blank or too long ingredient", body = ErrorResponse),
        (status = 502, description = "Provider lookup failed", body = ErrorResponse)
    )
)]
pub async fn recipes_by_ingredient_handler(
    State(state): State<Arc<AppState>>,
    Path(ingredient): Path<String>,
) -> Result<Json<RecipesResponse>, HandlerError> {
    let outcome = state
        .recipes
        .suggest(Some(ingredient.as_str()))
        .await
        .map_err(|e| search_failure(e, "Failed to fetch Recipe Suggestions"))?;

    let persistence = state.persistence.clone();
    let ingredient = outcome.ingredient.clone();
    let snapshot = outcome.recipes.clone();
    tokio::spawn(async move {
        persistence
            .persist(QueryTag::Recipe, ingredient.as_str(), &snapshot)
            .await;
    });

    Ok(Json(RecipesResponse {
        recipes: outcome.recipes,
    }))
}

/// Recent searches, newest first.
#[utoipa::path(
    get,
    path = "/api/search/history",
    params(("limit" = Option<usize>, Query, description = "Entries to return, 1 to 100 (default 20).")),
    responses(
        (status = 200, description = "History entries, newest first"),
        (status = 500, description = "No storage tier could be read", body = ErrorResponse)
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, HandlerError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    state.history.recent(limit).await.map(Json).map_err(|_| {
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An Error occurred Retrieving Search History",
        )
    })
}
