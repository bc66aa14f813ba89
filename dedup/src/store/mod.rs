pub mod memory_store;
pub mod sqlite_store;

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use market::CoinSymbol;

use crate::error::StoreError;

/// Persistent record of which coins were already notified.
///
/// A record's presence means "already notified". Expiry is not enforced by
/// the store; callers scan with [`list_expired`](Self::list_expired) and
/// [`remove`](Self::remove) what they have reported.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn exists(&self, symbol: &CoinSymbol) -> Result<bool, StoreError>;

    /// Records each symbol's price with `expires_at = now_ms + ttl`.
    ///
    /// Per-key atomic; an existing record for the same symbol is replaced.
    async fn record_batch(
        &self,
        prices: &HashMap<CoinSymbol, f64>,
        ttl: Duration,
        now_ms: u64,
    ) -> Result<(), StoreError>;

    /// Symbols whose `expires_at <= now_ms`.
    async fn list_expired(&self, now_ms: u64) -> Result<BTreeSet<CoinSymbol>, StoreError>;

    async fn notified_price(&self, symbol: &CoinSymbol) -> Result<Option<f64>, StoreError>;

    async fn remove(&self, symbols: &BTreeSet<CoinSymbol>) -> Result<(), StoreError>;
}

pub(crate) fn ttl_ms(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}
