//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, FileStore, SpoonacularAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::Router;
use food_wizard_core::{
    HistoryReader, IngredientSearch, PersistenceCoordinator, PipelineSettings, RecipeSearch,
    SearchStore, StoreChain,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Storage Tiers ---
    // The pool connects lazily so an unreachable database only degrades
    // individual calls to the file tier; every call retries the primary.
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.store_timeout)
        .connect_lazy(&config.database_url)?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    match db_adapter.run_migrations().await {
        Ok(()) => info!("Database migrations complete."),
        Err(e) => warn!("Database unavailable at startup, searches will fall back to files: {}", e),
    }

    let file_store = Arc::new(FileStore::new(config.storage_dir.clone()));
    if let Err(e) = file_store.ensure_dir().await {
        warn!(
            "Could not create search storage directory {}: {}",
            config.storage_dir.display(),
            e
        );
    }

    let tiers: Vec<Arc<dyn SearchStore>> = vec![db_adapter as Arc<dyn SearchStore>, file_store];
    let stores = StoreChain::new(tiers, config.store_timeout);

    // --- 3. Ingredient Provider ---
    let spoonacular = Arc::new(SpoonacularAdapter::new(
        config.spoonacular_base_url.clone(),
        config.spoonacular_api_key.clone(),
        config.upstream_timeout,
    )?);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        ingredients: IngredientSearch::new(
            spoonacular.clone(),
            PipelineSettings {
                enrich_concurrency: config.enrich_concurrency,
                upstream_timeout: config.upstream_timeout,
            },
        ),
        recipes: RecipeSearch::new(spoonacular, config.upstream_timeout),
        persistence: PersistenceCoordinator::new(stores.clone()),
        history: HistoryReader::new(stores),
    });

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
