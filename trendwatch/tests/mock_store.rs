#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use dedup::{DedupStore, StoreError};
use market::CoinSymbol;

/// Every call fails as if the database were gone.
#[derive(Default, Clone, Copy)]
pub struct UnavailableStore;

fn down() -> StoreError {
    StoreError::Unavailable(sqlx::Error::PoolClosed)
}

#[async_trait]
impl DedupStore for UnavailableStore {
    async fn exists(&self, _symbol: &CoinSymbol) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn record_batch(
        &self,
        _prices: &HashMap<CoinSymbol, f64>,
        _ttl: Duration,
        _now_ms: u64,
    ) -> Result<(), StoreError> {
        Err(down())
    }

    async fn list_expired(&self, _now_ms: u64) -> Result<BTreeSet<CoinSymbol>, StoreError> {
        Err(down())
    }

    async fn notified_price(&self, _symbol: &CoinSymbol) -> Result<Option<f64>, StoreError> {
        Err(down())
    }

    async fn remove(&self, _symbols: &BTreeSet<CoinSymbol>) -> Result<(), StoreError> {
        Err(down())
    }
}
