//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the primary storage tier. It is
//! the concrete implementation of the `SearchStore` port for PostgreSQL using
//! `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use food_wizard_core::domain::{RawTimestamp, SearchRecord, StoredSearch};
use food_wizard_core::ports::{PortError, PortResult, SearchStore};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SearchStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SearchRow {
    id: i64,
    query: String,
    results: Option<String>,
    created_at: DateTime<Utc>,
}
impl SearchRow {
    fn to_domain(self) -> StoredSearch {
        StoredSearch {
            id: Some(self.id),
            query: self.query,
            results: self.results.map(Value::String),
            created_at: Some(RawTimestamp::At(self.created_at)),
            timestamp: None,
        }
    }
}

//=========================================================================================
// `SearchStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SearchStore for DbAdapter {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn create(&self, record: &SearchRecord) -> PortResult<()> {
        sqlx::query("INSERT INTO searches (query, results, created_at) VALUES ($1, $2, $3)")
            .bind(&record.query)
            .bind(&record.results)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> PortResult<Vec<StoredSearch>> {
        let records = sqlx::query_as::<_, SearchRow>(
            "SELECT id, query, results, created_at FROM searches ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
