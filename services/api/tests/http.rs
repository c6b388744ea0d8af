//! HTTP-level tests: the assembled router with a fake ingredient provider,
//! a primary store that is always down, and a real file store.

use api_lib::adapters::FileStore;
use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use food_wizard_core::{
    Candidate, HistoryReader, IngredientCatalog, IngredientSearch, Nutrient, NutritionProfile,
    PersistenceCoordinator, PipelineSettings, PortError, PortResult, RecipeFinder, RecipeSearch,
    RecipeSuggestion, SearchRecord, SearchStore, StoreChain, StoredSearch,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

// ─── Fakes ──────────────────────────────────────────────────────────

struct FakeProvider {
    search_fails: bool,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(search_fails: bool) -> Arc<Self> {
        Arc::new(Self {
            search_fails,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl IngredientCatalog for FakeProvider {
    async fn search_ingredients(&self, _query: &str, _limit: usize) -> PortResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.search_fails {
            return Err(PortError::Unexpected("secret upstream payload".to_string()));
        }
        Ok([(2, "Banana"), (1, "Apple"), (3, "Mystery")]
            .into_iter()
            .map(|(id, name)| Candidate {
                id,
                name: name.to_string(),
                image: None,
                aisle: None,
                metadata: Map::new(),
            })
            .collect())
    }

    async fn ingredient_nutrition(&self, id: u64) -> PortResult<NutritionProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let kcal = match id {
            1 => 52.0,
            2 => 89.0,
            _ => return Err(PortError::Malformed("no nutrition".to_string())),
        };
        Ok(NutritionProfile {
            nutrients: vec![Nutrient {
                name: "Calories".to_string(),
                amount: kcal,
                unit: "kcal".to_string(),
            }],
            extra: Map::new(),
        })
    }

    async fn ingredient_details(&self, id: u64) -> PortResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "id": id, "name": "apple" }))
    }
}

#[async_trait]
impl RecipeFinder for FakeProvider {
    async fn recipes_by_ingredient(
        &self,
        ingredient: &str,
        _limit: usize,
    ) -> PortResult<Vec<RecipeSuggestion>> {
        Ok(vec![RecipeSuggestion {
            id: 641803,
            title: format!("Easy {} Crisp", ingredient),
            image: None,
            used_ingredient_count: 1,
            missed_ingredient_count: 3,
            likes: 12,
            extra: Map::new(),
        }])
    }
}

struct DownStore;

#[async_trait]
impl SearchStore for DownStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn create(&self, _record: &SearchRecord) -> PortResult<()> {
        Err(PortError::Unexpected("connection refused".to_string()))
    }

    async fn find_recent(&self, _limit: usize) -> PortResult<Vec<StoredSearch>> {
        Err(PortError::Unexpected("connection refused".to_string()))
    }
}

// ─── Harness ────────────────────────────────────────────────────────

fn test_config(storage_dir: &Path) -> Config {
    let vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://localhost/food_wizard_test"),
        ("SPOONACULAR_API_KEY", "test"),
        ("APP_ENV", "test"),
        ("SEARCH_STORAGE_DIR", storage_dir.to_str().unwrap()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Config::from_vars(vars).unwrap()
}

fn app(provider: Arc<FakeProvider>, storage_dir: &Path) -> Router {
    let stores = StoreChain::new(
        vec![
            Arc::new(DownStore) as Arc<dyn SearchStore>,
            Arc::new(FileStore::new(storage_dir)) as Arc<dyn SearchStore>,
        ],
        Duration::from_secs(2),
    );
    let state = AppState {
        config: Arc::new(test_config(storage_dir)),
        ingredients: IngredientSearch::new(provider.clone(), PipelineSettings::default()),
        recipes: RecipeSearch::new(provider, Duration::from_secs(2)),
        persistence: PersistenceCoordinator::new(stores.clone()),
        history: HistoryReader::new(stores),
    };
    router(Arc::new(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Persistence runs in the background; wait for it to land on disk.
async fn wait_for_files(dir: &Path, count: usize) -> Vec<Value> {
    for _ in 0..100 {
        if let Ok(entries) = std::fs::read_dir(dir) {
            let files: Vec<_> = entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
                .collect();
            if files.len() >= count {
                return files
                    .iter()
                    .map(|p| serde_json::from_slice(&std::fs::read(p).unwrap()).unwrap())
                    .collect();
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("expected {} search files in {}", count, dir.display());
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_environment() {
    let tmp = TempDir::new().unwrap();
    let (status, body) = get(&app(FakeProvider::new(false), tmp.path()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn invalid_queries_are_400_without_provider_calls() {
    let tmp = TempDir::new().unwrap();
    let provider = FakeProvider::new(false);
    let app = app(provider.clone(), tmp.path());

    let (status, body) = get(&app, "/api/ingredients").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Search Parameter is Required");

    let (status, _) = get(&app, "/api/ingredients?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "a".repeat(101);
    let (status, body) = get(&app, &format!("/api/ingredients?query={}", long)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query Too Long (max 100 chars)");

    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_answers_even_when_primary_store_is_down() {
    let tmp = TempDir::new().unwrap();
    let app = app(FakeProvider::new(false), tmp.path());

    let (status, body) = get(&app, "/api/ingredients?query=apple").await;
    assert_eq!(status, StatusCode::OK);
    let selection = body["selection"].as_array().unwrap();
    assert_eq!(selection.len(), 2);
    assert_eq!(selection[0]["name"], "Apple");
    assert_eq!(selection[0]["calories"], 52.0);
    assert_eq!(selection[1]["name"], "Banana");

    let files = wait_for_files(tmp.path(), 1).await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["query"], "apple");
    let snapshot: Value = serde_json::from_str(files[0]["results"].as_str().unwrap()).unwrap();
    assert_eq!(&snapshot, &body["selection"]);
}

#[tokio::test]
async fn provider_failure_is_502_and_nothing_is_saved() {
    let tmp = TempDir::new().unwrap();
    let app = app(FakeProvider::new(true), tmp.path());

    let (status, body) = get(&app, "/api/ingredients?query=apple").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch Food Data");
    assert!(!body.to_string().contains("secret"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let saved = std::fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(saved, 0);
}

#[tokio::test]
async fn details_require_a_positive_numeric_id() {
    let tmp = TempDir::new().unwrap();
    let app = app(FakeProvider::new(false), tmp.path());

    for uri in ["/api/ingredients/details/abc", "/api/ingredients/details/0", "/api/ingredients/details/-4"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "Invalid Ingredient ID");
    }

    let (status, body) = get(&app, "/api/ingredients/details/9003").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 9003);
}

#[tokio::test]
async fn history_falls_back_to_files_with_synthesized_ids() {
    let tmp = TempDir::new().unwrap();
    let app = app(FakeProvider::new(false), tmp.path());

    get(&app, "/api/ingredients?query=apple").await;
    wait_for_files(tmp.path(), 1).await;
    get(&app, "/api/ingredients/recipes/by-ingredient/apple").await;
    wait_for_files(tmp.path(), 2).await;

    let (status, body) = get(&app, "/api/search/history").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for (index, entry) in entries.iter().enumerate() {
        let id = entry["id"].as_str().unwrap();
        assert!(id.starts_with("file-"), "{}", id);
        assert!(id.ends_with(&format!("-{}", index)), "{}", id);
        assert!(entry["timestamp"].as_str().unwrap().ends_with('Z'));
    }
    assert!(entries[0]["timestamp"].as_str() >= entries[1]["timestamp"].as_str());

    let recipe = entries
        .iter()
        .find(|e| e["kind"] == "recipe")
        .expect("recipe search in history");
    assert_eq!(recipe["query"], "recipe:apple");
    assert_eq!(recipe["results"][0]["title"], "Easy apple Crisp");

    let (_, limited) = get(&app, "/api/search/history?limit=1").await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn history_is_500_when_every_tier_fails() {
    let tmp = TempDir::new().unwrap();
    // A regular file where the storage directory should be makes the file tier unreadable.
    let blocked = tmp.path().join("searches");
    std::fs::write(&blocked, "not a directory").unwrap();
    let app = app(FakeProvider::new(false), &blocked);

    let (status, body) = get(&app, "/api/search/history").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An Error occurred Retrieving Search History");
}
