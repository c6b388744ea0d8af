//! crates/food_wizard_core/src/domain.rs
//!
//! Defines the core data structures for ingredient discovery and search history.
//! Field names serialize in the camelCase shape the front-end already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the nutrient that carries the energy value of a serving.
pub const CALORIES_NUTRIENT: &str = "Calories";

//=========================================================================================
// Queries
//=========================================================================================

/// A trimmed, accepted search query (1 to 100 characters).
///
/// Only the validator can build one, so holding a `ValidQuery` means the
/// input has already been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery(String);

impl ValidQuery {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ValidQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The namespace a persisted search belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTag {
    Ingredient,
    Recipe,
}

impl QueryTag {
    /// The prefix stored in front of the query text.
    pub fn prefix(self) -> &'static str {
        match self {
            QueryTag::Ingredient => "",
            QueryTag::Recipe => "recipe:",
        }
    }

    /// Builds the stored query. Ingredient queries that would read back as
    /// tagged are escaped with [`INGREDIENT_ESCAPE`].
    pub fn apply(self, query: &str) -> String {
        match self {
            QueryTag::Ingredient if is_tagged(query) => format!("{}{}", INGREDIENT_ESCAPE, query),
            _ => format!("{}{}", self.prefix(), query),
        }
    }

    /// Recovers the tag from a stored query string, along with the query as
    /// history shows it: recipe entries keep their prefix, escaped ingredient
    /// queries lose the escape.
    pub fn detect(stored_query: &str) -> (Self, &str) {
        if let Some(query) = stored_query.strip_prefix(INGREDIENT_ESCAPE) {
            (QueryTag::Ingredient, query)
        } else if stored_query.starts_with(QueryTag::Recipe.prefix()) {
            (QueryTag::Recipe, stored_query)
        } else {
            (QueryTag::Ingredient, stored_query)
        }
    }
}

/// Marks a stored ingredient query whose own text starts with a tag prefix.
pub const INGREDIENT_ESCAPE: &str = "ingredient:";

fn is_tagged(query: &str) -> bool {
    query.starts_with(QueryTag::Recipe.prefix()) || query.starts_with(INGREDIENT_ESCAPE)
}

//=========================================================================================
// Provider Data
//=========================================================================================

/// An unenriched ingredient returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aisle: Option<String>,
    /// Any other provider fields, kept opaque.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Per-serving nutrition for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NutritionProfile {
    /// The calorie entry, if the provider reported a usable one.
    pub fn calories(&self) -> Option<&Nutrient> {
        self.nutrients
            .iter()
            .find(|n| n.name == CALORIES_NUTRIENT && n.amount.is_finite())
    }
}

/// A candidate with resolved calorie data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub calories: f64,
    pub calorie_unit: String,
    pub nutrition_data: NutritionProfile,
}

impl EnrichedCandidate {
    /// Builds an enriched candidate, or `None` when the profile has no calories.
    pub fn from_profile(candidate: Candidate, profile: NutritionProfile) -> Option<Self> {
        let calories = profile.calories()?;
        Some(Self {
            calories: calories.amount,
            calorie_unit: calories.unit.clone(),
            candidate,
            nutrition_data: profile,
        })
    }
}

/// A recipe suggestion returned by the find-by-ingredients lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestion {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub likes: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//=========================================================================================
// Persistence
//=========================================================================================

/// The durable unit written once per completed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// The query, already carrying its tag prefix.
    pub query: String,
    /// Serialized result snapshot; always a valid JSON array.
    pub results: String,
    pub created_at: DateTime<Utc>,
}

/// A timestamp as some store happened to record it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    At(DateTime<Utc>),
    Text(String),
    EpochMillis(i64),
}

/// A search as read back from any store, before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredSearch {
    pub id: Option<i64>,
    pub query: String,
    /// Either an encoded JSON string or an inline array.
    pub results: Option<Value>,
    pub created_at: Option<RawTimestamp>,
    pub timestamp: Option<RawTimestamp>,
}

/// Identifier of a history entry: the store's own id or a synthesized one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Native(i64),
    Synthesized(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryResults {
    Ingredients(Vec<EnrichedCandidate>),
    Recipes(Vec<RecipeSuggestion>),
}

/// The normalized read-side shape of a stored search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub kind: QueryTag,
    pub query: String,
    pub results: HistoryResults,
    /// RFC 3339 / ISO-8601 string.
    pub timestamp: String,
}
