//! services/api/src/adapters/spoonacular.rs
//!
//! This module contains the adapter for the Spoonacular food API.
//! It implements the `IngredientCatalog` and `RecipeFinder` ports from the `core` crate.

use async_trait::async_trait;
use food_wizard_core::domain::{Candidate, NutritionProfile, RecipeSuggestion};
use food_wizard_core::ports::{IngredientCatalog, PortError, PortResult, RecipeFinder};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

//=========================================================================================
// Wire Shapes
//=========================================================================================

#[derive(Deserialize)]
struct IngredientSearchResponse {
    #[serde(default)]
    results: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct IngredientInformation {
    #[serde(default)]
    nutrition: Option<NutritionProfile>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that talks to the Spoonacular REST API over `reqwest`.
#[derive(Clone)]
pub struct SpoonacularAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularAdapter {
    /// Creates a new `SpoonacularAdapter` whose every request is bounded by `timeout`.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> PortResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "Spoonacular request to {} failed with status {}",
                path, status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Malformed(format!("{}: {}", path, e.without_url())))
    }

    fn information_params() -> Vec<(&'static str, String)> {
        vec![
            ("amount", "1".to_string()),
            ("unit", "serving".to_string()),
            ("includeNutrition", "true".to_string()),
        ]
    }
}

fn map_transport_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout(e.without_url().to_string())
    } else {
        PortError::Unexpected(e.without_url().to_string())
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl IngredientCatalog for SpoonacularAdapter {
    async fn search_ingredients(&self, query: &str, limit: usize) -> PortResult<Vec<Candidate>> {
        let params = [
            ("query", query.to_string()),
            ("number", limit.to_string()),
            ("metaInformation", "true".to_string()),
        ];
        let response: IngredientSearchResponse =
            self.get_json("/food/ingredients/search", &params).await?;
        Ok(response.results.unwrap_or_default())
    }

    async fn ingredient_nutrition(&self, id: u64) -> PortResult<NutritionProfile> {
        let path = format!("/food/ingredients/{}/information", id);
        let info: IngredientInformation = self
            .get_json(&path, &Self::information_params())
            .await?;
        info.nutrition
            .ok_or_else(|| PortError::Malformed(format!("ingredient {} has no nutrition data", id)))
    }

    async fn ingredient_details(&self, id: u64) -> PortResult<serde_json::Value> {
        let path = format!("/food/ingredients/{}/information", id);
        self.get_json(&path, &Self::information_params()).await
    }
}

#[async_trait]
impl RecipeFinder for SpoonacularAdapter {
    async fn recipes_by_ingredient(
        &self,
        ingredient: &str,
        limit: usize,
    ) -> PortResult<Vec<RecipeSuggestion>> {
        let params = [
            ("ingredients", ingredient.to_string()),
            ("number", limit.to_string()),
            ("ranking", "1".to_string()),
            ("ignorePantry", "true".to_string()),
        ];
        self.get_json("/recipes/findByIngredients", &params).await
    }
}
