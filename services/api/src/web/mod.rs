pub mod rest;
pub mod state;

pub use rest::{
    health_handler, history_handler, ingredient_details_handler, recipes_by_ingredient_handler,
    search_ingredients_handler,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Builds the `/api` router with its CORS and body-size layers.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/ingredients", get(search_ingredients_handler))
        .route("/ingredients/details/{id}", get(ingredient_details_handler))
        .route(
            "/ingredients/recipes/by-ingredient/{ingredient}",
            get(recipes_by_ingredient_handler),
        )
        .route("/search/history", get(history_handler));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&app_state.config.cors_allowed_origin))
        .with_state(app_state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!("Ignoring invalid CORS origin '{}'", origin);
            cors
        }
    }
}
