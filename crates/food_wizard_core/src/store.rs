//! crates/food_wizard_core/src/store.rs
//!
//! An ordered chain of storage tiers. Writes go to the first tier that
//! accepts them; reads come from the first tier that answers. Each call is
//! bounded by a timeout, and a timeout counts as a tier failure.

use crate::domain::{SearchRecord, StoredSearch};
use crate::ports::{PortError, PortResult, SearchStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct StoreChain {
    tiers: Vec<Arc<dyn SearchStore>>,
    timeout: Duration,
}

/// The tier that handled a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub tier: String,
    /// Position in the chain; 0 is the primary.
    pub rank: usize,
}

/// Every tier failed; carries the last error seen.
#[derive(Debug, thiserror::Error)]
#[error("all {tiers} storage tiers failed; last error: {last}")]
pub struct ChainExhausted {
    pub tiers: usize,
    pub last: PortError,
}

impl StoreChain {
    /// Builds a chain in priority order.
    pub fn new(tiers: Vec<Arc<dyn SearchStore>>, timeout: Duration) -> Self {
        Self { tiers, timeout }
    }

    pub async fn write(&self, record: &SearchRecord) -> Result<Served, ChainExhausted> {
        let mut last = PortError::Unexpected("no storage tiers configured".to_string());
        for (rank, tier) in self.tiers.iter().enumerate() {
            match self.bounded(tier.name(), tier.create(record)).await {
                Ok(()) => return Ok(served(tier.as_ref(), rank)),
                Err(e) => {
                    warn!("Storage tier '{}' rejected search record: {}", tier.name(), e);
                    last = e;
                }
            }
        }
        Err(ChainExhausted {
            tiers: self.tiers.len(),
            last,
        })
    }

    pub async fn read_recent(
        &self,
        limit: usize,
    ) -> Result<(Served, Vec<StoredSearch>), ChainExhausted> {
        let mut last = PortError::Unexpected("no storage tiers configured".to_string());
        for (rank, tier) in self.tiers.iter().enumerate() {
            match self.bounded(tier.name(), tier.find_recent(limit)).await {
                Ok(records) => return Ok((served(tier.as_ref(), rank), records)),
                Err(e) => {
                    warn!("Storage tier '{}' could not be read: {}", tier.name(), e);
                    last = e;
                }
            }
        }
        Err(ChainExhausted {
            tiers: self.tiers.len(),
            last,
        })
    }

    async fn bounded<T>(
        &self,
        tier: &str,
        call: impl std::future::Future<Output = PortResult<T>>,
    ) -> PortResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| PortError::Timeout(format!("storage tier '{}'", tier)))?
    }
}

fn served(tier: &dyn SearchStore, rank: usize) -> Served {
    Served {
        tier: tier.name().to_string(),
        rank,
    }
}
