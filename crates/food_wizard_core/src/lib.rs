pub mod domain;
pub mod enrich;
pub mod history;
pub mod persist;
pub mod ports;
pub mod ranking;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod validate;

pub use domain::{
    Candidate, EnrichedCandidate, EntryId, HistoryEntry, HistoryResults, Nutrient,
    NutritionProfile, QueryTag, RawTimestamp, RecipeSuggestion, SearchRecord, StoredSearch,
    ValidQuery,
};
pub use history::{HistoryError, HistoryReader};
pub use persist::{PersistOutcome, PersistenceCoordinator};
pub use ports::{IngredientCatalog, PortError, PortResult, RecipeFinder, SearchStore};
pub use search::{IngredientSearch, PipelineSettings, RecipeSearch, SearchError, SearchOutcome};
pub use store::StoreChain;
pub use validate::{validate, QueryRejection};
