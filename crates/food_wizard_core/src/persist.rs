//! The persistence coordinator: best-effort recording of completed searches.

use crate::domain::{QueryTag, SearchRecord};
use crate::snapshot::freeze;
use crate::store::{Served, StoreChain};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Stored(Served),
    /// Every tier failed; the record was logged and dropped.
    Dropped,
}

/// Owns the write path into every storage tier.
#[derive(Clone)]
pub struct PersistenceCoordinator {
    stores: StoreChain,
}

impl PersistenceCoordinator {
    pub fn new(stores: StoreChain) -> Self {
        Self { stores }
    }

    /// Records one completed search. Never returns an error: storage failures
    /// fall through the tiers and end in a log line at worst.
    pub async fn persist<T: Serialize>(
        &self,
        tag: QueryTag,
        query: &str,
        selection: &[T],
    ) -> PersistOutcome {
        let record = SearchRecord {
            query: tag.apply(query),
            results: freeze(selection),
            created_at: Utc::now(),
        };

        match self.stores.write(&record).await {
            Ok(served) => {
                if served.rank > 0 {
                    info!(
                        "Search '{}' saved to fallback tier '{}'",
                        record.query, served.tier
                    );
                }
                PersistOutcome::Stored(served)
            }
            Err(e) => {
                error!("Search '{}' was not saved: {}", record.query, e);
                PersistOutcome::Dropped
            }
        }
    }
}
