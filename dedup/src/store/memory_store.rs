use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use market::CoinSymbol;
use tokio::sync::Mutex;

use super::{DedupStore, ttl_ms};
use crate::error::StoreError;
use crate::model::DedupRecord;

/// Process-local store. Loses state on restart.
#[derive(Default, Clone)]
pub struct InMemoryDedupStore {
    pub map: Arc<Mutex<HashMap<CoinSymbol, DedupRecord>>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_direct(&self, record: DedupRecord) {
        self.map.lock().await.insert(record.symbol.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn exists(&self, symbol: &CoinSymbol) -> Result<bool, StoreError> {
        Ok(self.map.lock().await.contains_key(symbol))
    }

    async fn record_batch(
        &self,
        prices: &HashMap<CoinSymbol, f64>,
        ttl: Duration,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        let ttl = ttl_ms(ttl);
        let mut map = self.map.lock().await;
        for (symbol, &price) in prices {
            map.insert(
                symbol.clone(),
                DedupRecord::new(symbol.clone(), price, now_ms, ttl),
            );
        }
        Ok(())
    }

    async fn list_expired(&self, now_ms: u64) -> Result<BTreeSet<CoinSymbol>, StoreError> {
        Ok(self
            .map
            .lock()
            .await
            .values()
            .filter(|r| r.is_expired(now_ms))
            .map(|r| r.symbol.clone())
            .collect())
    }

    async fn notified_price(&self, symbol: &CoinSymbol) -> Result<Option<f64>, StoreError> {
        Ok(self.map.lock().await.get(symbol).map(|r| r.notified_price))
    }

    async fn remove(&self, symbols: &BTreeSet<CoinSymbol>) -> Result<(), StoreError> {
        let mut map = self.map.lock().await;
        for s in symbols {
            map.remove(s);
        }
        Ok(())
    }
}
