//! crates/food_wizard_core/src/history.rs
//!
//! The history reader. One storage tier is the source of truth per call;
//! records from whichever tier answered are normalized into `HistoryEntry`
//! values with a single id scheme and an ISO-8601 timestamp.

use crate::domain::{
    EnrichedCandidate, EntryId, HistoryEntry, HistoryResults, QueryTag, RawTimestamp,
    RecipeSuggestion, StoredSearch,
};
use crate::snapshot::thaw_value;
use crate::store::StoreChain;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use tracing::{debug, error, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("search history is unavailable")]
    Unavailable,
}

#[derive(Clone)]
pub struct HistoryReader {
    stores: StoreChain,
}

impl HistoryReader {
    pub fn new(stores: StoreChain) -> Self {
        Self { stores }
    }

    /// The most recent searches, newest first, at most `limit` of them.
    pub async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let (served, records) = self.stores.read_recent(limit).await.map_err(|e| {
            error!("Could not read search history: {}", e);
            HistoryError::Unavailable
        })?;
        debug!(
            "Read {} history records from tier '{}'",
            records.len(),
            served.tier
        );
        Ok(normalize(records, limit, Utc::now()))
    }
}

/// Turns raw records from any tier into history entries.
///
/// `now` stands in for records that carry no usable timestamp.
pub fn normalize(records: Vec<StoredSearch>, limit: usize, now: DateTime<Utc>) -> Vec<HistoryEntry> {
    let mut dated: Vec<(DateTime<Utc>, StoredSearch)> = records
        .into_iter()
        .map(|record| (resolve_created_at(&record, now), record))
        .collect();

    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.truncate(limit);

    dated
        .into_iter()
        .enumerate()
        .map(|(index, (at, record))| to_entry(index, at, record))
        .collect()
}

fn to_entry(index: usize, at: DateTime<Utc>, record: StoredSearch) -> HistoryEntry {
    let id = match record.id {
        Some(id) => EntryId::Native(id),
        None => EntryId::Synthesized(format!("file-{}-{}", at.timestamp_millis(), index)),
    };
    let (kind, query) = QueryTag::detect(&record.query);
    let query = query.to_string();
    let results = match kind {
        QueryTag::Ingredient => {
            HistoryResults::Ingredients(thaw_value::<EnrichedCandidate>(record.results.as_ref()))
        }
        QueryTag::Recipe => {
            HistoryResults::Recipes(thaw_value::<RecipeSuggestion>(record.results.as_ref()))
        }
    };

    HistoryEntry {
        id,
        kind,
        query,
        results,
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// `created_at` wins, then `timestamp`, then `now`.
fn resolve_created_at(record: &StoredSearch, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Some(at) = record.created_at.as_ref().and_then(parse_timestamp) {
        return at;
    }
    if let Some(at) = record.timestamp.as_ref().and_then(parse_timestamp) {
        return at;
    }
    warn!(
        "History record for '{}' has no usable timestamp; using the current time",
        record.query
    );
    now
}

fn parse_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::At(at) => Some(*at),
        RawTimestamp::EpochMillis(ms) => Utc.timestamp_millis_opt(*ms).single(),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|at| at.with_timezone(&Utc))
            .or_else(|_| text.parse::<DateTime<Utc>>())
            .ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn record(query: &str) -> StoredSearch {
        StoredSearch {
            query: query.to_string(),
            results: Some(json!("[]")),
            ..StoredSearch::default()
        }
    }

    #[test]
    fn created_at_wins_over_timestamp() {
        let mut r = record("apple");
        r.created_at = Some(RawTimestamp::Text("2025-01-02T00:00:00Z".to_string()));
        r.timestamp = Some(RawTimestamp::EpochMillis(0));
        let now = at("2030-01-01T00:00:00Z");
        assert_eq!(resolve_created_at(&r, now), at("2025-01-02T00:00:00Z"));
    }

    #[test]
    fn falls_back_to_timestamp_then_now() {
        let now = at("2030-01-01T00:00:00Z");

        let mut r = record("apple");
        r.created_at = Some(RawTimestamp::Text("yesterday-ish".to_string()));
        r.timestamp = Some(RawTimestamp::EpochMillis(1_735_689_600_000));
        assert_eq!(resolve_created_at(&r, now), at("2025-01-01T00:00:00Z"));

        assert_eq!(resolve_created_at(&record("pear"), now), now);
    }

    #[test]
    fn synthesized_ids_are_unique_per_response() {
        let now = at("2030-01-01T00:00:00Z");
        let entries = normalize(vec![record("a"), record("b")], 20, now);
        let millis = now.timestamp_millis();
        assert_eq!(
            entries[0].id,
            EntryId::Synthesized(format!("file-{}-0", millis))
        );
        assert_eq!(
            entries[1].id,
            EntryId::Synthesized(format!("file-{}-1", millis))
        );
    }

    #[test]
    fn native_ids_are_kept() {
        let mut r = record("apple");
        r.id = Some(41);
        r.created_at = Some(RawTimestamp::At(at("2025-01-01T00:00:00Z")));
        let entries = normalize(vec![r], 20, Utc::now());
        assert_eq!(entries[0].id, EntryId::Native(41));
        assert_eq!(entries[0].timestamp, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn sorts_newest_first_and_applies_limit() {
        let dated = |q: &str, ms: i64| {
            let mut r = record(q);
            r.timestamp = Some(RawTimestamp::EpochMillis(ms));
            r
        };
        let entries = normalize(
            vec![dated("old", 1_000), dated("new", 3_000), dated("mid", 2_000)],
            2,
            Utc::now(),
        );
        let queries: Vec<_> = entries.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, ["new", "mid"]);
    }

    #[test]
    fn recipe_entries_are_tagged() {
        let mut r = record("recipe:chicken");
        r.results = Some(json!(
            "[{\"id\":7,\"title\":\"Roast\",\"usedIngredientCount\":1,\"missedIngredientCount\":2,\"likes\":3}]"
        ));
        let entries = normalize(vec![r], 20, Utc::now());
        assert_eq!(entries[0].kind, QueryTag::Recipe);
        match &entries[0].results {
            HistoryResults::Recipes(recipes) => assert_eq!(recipes[0].title, "Roast"),
            other => panic!("expected recipes, got {:?}", other),
        }
    }

    #[test]
    fn ingredient_query_that_starts_with_recipe_keeps_its_results() {
        let mut r = record(&QueryTag::Ingredient.apply("recipe:apple"));
        r.results = Some(json!(
            "[{\"id\":9003,\"name\":\"apple\",\"calories\":52.0,\"calorieUnit\":\"kcal\",\"nutritionData\":{\"nutrients\":[]}}]"
        ));
        let entries = normalize(vec![r], 20, Utc::now());
        assert_eq!(entries[0].kind, QueryTag::Ingredient);
        assert_eq!(entries[0].query, "recipe:apple");
        match &entries[0].results {
            HistoryResults::Ingredients(found) => assert_eq!(found[0].candidate.id, 9003),
            other => panic!("expected ingredients, got {:?}", other),
        }
    }

    #[test]
    fn corrupt_snapshot_only_empties_its_entry() {
        let mut bad = record("apple");
        bad.results = Some(json!("[{broken"));
        bad.timestamp = Some(RawTimestamp::EpochMillis(2_000));
        let mut good = record("pear");
        good.timestamp = Some(RawTimestamp::EpochMillis(1_000));

        let entries = normalize(vec![bad, good], 20, Utc::now());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].results, HistoryResults::Ingredients(Vec::new()));
    }
}
