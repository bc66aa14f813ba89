pub mod coinmarketcap;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::MarketError;
use crate::types::CoinSymbol;

pub use coinmarketcap::CoinMarketCapScraper;

/// Listing tickers that the price feed knows under another name.
pub const RENAMES: &[(&str, &str)] = &[("MIOTA", "IOT")];

/// Source of the coin universe evaluated on each pass.
#[async_trait]
pub trait CoinUniverse: Send + Sync + 'static {
    /// Raw tickers in listing order; normalization happens downstream.
    async fn fetch_raw(&self) -> Result<Vec<String>, MarketError>;

    async fn fetch(&self) -> Result<Vec<CoinSymbol>, MarketError> {
        Ok(normalize_universe(self.fetch_raw().await?))
    }
}

/// Fixed list, e.g. from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticUniverse {
    symbols: Vec<String>,
}

impl StaticUniverse {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl CoinUniverse for StaticUniverse {
    async fn fetch_raw(&self) -> Result<Vec<String>, MarketError> {
        Ok(self.symbols.clone())
    }
}

/// Uppercases, applies [`RENAMES`], drops blanks and duplicates.
///
/// First occurrence wins, so listing order is preserved.
pub fn normalize_universe<I, S>(raw: I) -> Vec<CoinSymbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for r in raw {
        let mut sym = CoinSymbol::new(r);
        if sym.as_str().is_empty() {
            continue;
        }
        if let Some((_, to)) = RENAMES.iter().find(|(from, _)| *from == sym.as_str()) {
            sym = CoinSymbol::new(to);
        }
        if seen.insert(sym.clone()) {
            out.push(sym);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[CoinSymbol]) -> Vec<&str> {
        v.iter().map(CoinSymbol::as_str).collect()
    }

    #[test]
    fn miota_is_renamed() {
        let out = normalize_universe(["BTC", "MIOTA", "ETH"]);

        assert_eq!(names(&out), vec!["BTC", "IOT", "ETH"]);
    }

    #[test]
    fn duplicates_and_blanks_are_dropped_in_order() {
        let out = normalize_universe(["eth", "BTC", " ", "ETH", "IOT", "MIOTA"]);

        assert_eq!(names(&out), vec!["ETH", "BTC", "IOT"]);
    }

    #[tokio::test]
    async fn static_universe_is_normalized() {
        let u = StaticUniverse::new(["ada", "ada", "xrp"]);

        let out = u.fetch().await.unwrap();

        assert_eq!(names(&out), vec!["ADA", "XRP"]);
    }
}
