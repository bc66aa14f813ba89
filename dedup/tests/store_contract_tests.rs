//! The same lifecycle checks run against every `DedupStore` backend.
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use dedup::{DedupStore, InMemoryDedupStore, SqliteDedupStore};
use market::CoinSymbol;
use sqlx::sqlite::SqlitePoolOptions;

const HOUR_MS: u64 = 3_600_000;
const T0: u64 = 1_700_000_000_000;

async fn sqlite_store() -> SqliteDedupStore {
    // `:memory:` gets a unique shared-cache name per options instance, so
    // every pool here is isolated while its connections share one db.
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(4)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let store = SqliteDedupStore::from_pool(pool);
    store.migrate().await.unwrap();
    store
}

fn sym(s: &str) -> CoinSymbol {
    CoinSymbol::new(s)
}

fn prices(entries: &[(&str, f64)]) -> HashMap<CoinSymbol, f64> {
    entries.iter().map(|(s, p)| (sym(s), *p)).collect()
}

fn set(entries: &[&str]) -> BTreeSet<CoinSymbol> {
    entries.iter().map(|s| sym(s)).collect()
}

async fn exists_tracks_record_and_remove(store: &dyn DedupStore) -> anyhow::Result<()> {
    assert!(!store.exists(&sym("ETH")).await?);

    store
        .record_batch(&prices(&[("ETH", 0.05), ("ADA", 0.000_01)]), Duration::from_secs(3600), T0)
        .await?;

    assert!(store.exists(&sym("ETH")).await?);
    assert!(store.exists(&sym("ADA")).await?);
    assert!(!store.exists(&sym("XRP")).await?);

    store.remove(&set(&["ETH"])).await?;

    assert!(!store.exists(&sym("ETH")).await?);
    assert!(store.exists(&sym("ADA")).await?);
    Ok(())
}

async fn expiry_boundary_is_inclusive(store: &dyn DedupStore) -> anyhow::Result<()> {
    let ttl = Duration::from_millis(24 * HOUR_MS);
    store.record_batch(&prices(&[("LINK", 0.0002)]), ttl, T0).await?;

    assert!(store.list_expired(T0).await?.is_empty());
    assert!(store.list_expired(T0 + 24 * HOUR_MS - 1).await?.is_empty());
    assert_eq!(store.list_expired(T0 + 24 * HOUR_MS).await?, set(&["LINK"]));
    assert_eq!(store.list_expired(T0 + 100 * HOUR_MS).await?, set(&["LINK"]));
    Ok(())
}

async fn only_expired_symbols_are_listed(store: &dyn DedupStore) -> anyhow::Result<()> {
    store
        .record_batch(&prices(&[("OLD", 1.0)]), Duration::from_millis(HOUR_MS), T0)
        .await?;
    store
        .record_batch(&prices(&[("NEW", 2.0)]), Duration::from_millis(HOUR_MS), T0 + 10 * HOUR_MS)
        .await?;

    assert_eq!(store.list_expired(T0 + 5 * HOUR_MS).await?, set(&["OLD"]));
    Ok(())
}

async fn notified_price_round_trips(store: &dyn DedupStore) -> anyhow::Result<()> {
    store
        .record_batch(&prices(&[("DOGE", 0.000_000_42), ("ZERO", 0.0)]), Duration::from_secs(1), T0)
        .await?;

    assert_eq!(store.notified_price(&sym("DOGE")).await?, Some(0.000_000_42));
    assert_eq!(store.notified_price(&sym("ZERO")).await?, Some(0.0));
    assert_eq!(store.notified_price(&sym("NONE")).await?, None);

    store.remove(&set(&["DOGE", "ZERO", "NONE"])).await?;
    assert_eq!(store.notified_price(&sym("DOGE")).await?, None);
    Ok(())
}

async fn empty_batches_are_noops(store: &dyn DedupStore) -> anyhow::Result<()> {
    store.record_batch(&HashMap::new(), Duration::from_secs(1), T0).await?;
    store.remove(&BTreeSet::new()).await?;

    assert!(store.list_expired(u64::MAX).await?.is_empty());
    Ok(())
}

macro_rules! contract {
    ($name:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn in_memory() -> anyhow::Result<()> {
                super::$name(&InMemoryDedupStore::new()).await
            }

            #[tokio::test]
            async fn sqlite() -> anyhow::Result<()> {
                super::$name(&sqlite_store().await).await
            }
        }
    };
}

contract!(exists_tracks_record_and_remove);
contract!(expiry_boundary_is_inclusive);
contract!(only_expired_symbols_are_listed);
contract!(notified_price_round_trips);
contract!(empty_batches_are_noops);
