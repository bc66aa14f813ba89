pub mod client;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::MarketError;
use crate::types::{CoinSymbol, PricePoint};

pub use client::CryptoCompareClient;

/// Upstream source of price history and spot prices.
#[async_trait]
pub trait MarketDataApi: Send + Sync + 'static {
    /// Hourly bars for `symbol` in its quote currency, oldest first.
    async fn history(
        &self,
        symbol: &CoinSymbol,
        limit: usize,
    ) -> Result<Vec<PricePoint>, MarketError>;

    /// Current unit price of each symbol in its quote currency.
    ///
    /// Symbols the upstream does not price are absent from the map.
    async fn current_prices(
        &self,
        symbols: &[CoinSymbol],
    ) -> Result<HashMap<CoinSymbol, f64>, MarketError>;
}
