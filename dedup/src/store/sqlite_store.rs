//! SQLite-backed dedup store.
//!
//! One row per notified coin. Rows are only ever inserted (by
//! `record_batch`) and deleted (by `remove`), so a crash mid-pass leaves
//! either the whole row or nothing.
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use common::logger::warn_if_slow;
use market::CoinSymbol;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use super::{DedupStore, ttl_ms};
use crate::error::StoreError;

const SLOW_QUERY: Duration = Duration::from_millis(100);

pub struct SqliteDedupStore {
    pool: SqlitePool,
}

impl SqliteDedupStore {
    /// Wraps an existing pool. Call [`migrate`](Self::migrate) before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and ensures the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS notified_coins (
  symbol TEXT PRIMARY KEY,
  notified_price REAL NOT NULL,
  expires_at_ms INTEGER NOT NULL
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_notified_coins_expiry ON notified_coins(expires_at_ms);"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    #[instrument(skip(self), target = "store", fields(symbol = %symbol))]
    async fn exists(&self, symbol: &CoinSymbol) -> Result<bool, StoreError> {
        let row = warn_if_slow("db_exists", SLOW_QUERY, async {
            sqlx::query("SELECT 1 FROM notified_coins WHERE symbol = ?")
                .bind(symbol.as_str())
                .fetch_optional(&self.pool)
                .await
        })
        .await?;

        Ok(row.is_some())
    }

    #[instrument(skip(self, prices), target = "store", fields(count = prices.len()))]
    async fn record_batch(
        &self,
        prices: &HashMap<CoinSymbol, f64>,
        ttl: Duration,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        let expires_at_ms = now_ms.saturating_add(ttl_ms(ttl));
        let expires_at = i64::try_from(expires_at_ms).unwrap_or(i64::MAX);

        let mut tx = self.pool.begin().await?;
        for (symbol, price) in prices {
            sqlx::query(
                r#"
INSERT OR REPLACE INTO notified_coins (symbol, notified_price, expires_at_ms)
VALUES (?, ?, ?);
"#,
            )
            .bind(symbol.as_str())
            .bind(*price)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(expires_at_ms, "dedup records written");
        Ok(())
    }

    #[instrument(skip(self), target = "store")]
    async fn list_expired(&self, now_ms: u64) -> Result<BTreeSet<CoinSymbol>, StoreError> {
        let now = i64::try_from(now_ms).unwrap_or(i64::MAX);

        let rows = warn_if_slow("db_list_expired", SLOW_QUERY, async {
            sqlx::query("SELECT symbol FROM notified_coins WHERE expires_at_ms <= ?")
                .bind(now)
                .fetch_all(&self.pool)
                .await
        })
        .await?;

        rows.iter()
            .map(|r| {
                r.try_get::<String, _>("symbol")
                    .map(CoinSymbol::new)
                    .map_err(|e| StoreError::Corrupt {
                        symbol: "<null>".to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    #[instrument(skip(self), target = "store", fields(symbol = %symbol))]
    async fn notified_price(&self, symbol: &CoinSymbol) -> Result<Option<f64>, StoreError> {
        let row = sqlx::query("SELECT notified_price FROM notified_coins WHERE symbol = ?")
            .bind(symbol.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            r.try_get::<f64, _>("notified_price")
                .map_err(|e| StoreError::Corrupt {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
    }

    #[instrument(skip(self, symbols), target = "store", fields(count = symbols.len()))]
    async fn remove(&self, symbols: &BTreeSet<CoinSymbol>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for symbol in symbols {
            sqlx::query("DELETE FROM notified_coins WHERE symbol = ?")
                .bind(symbol.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
