use std::fmt;

use serde::{Deserialize, Serialize};

/// Short uppercase ticker, e.g. `ETH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoinSymbol(String);

impl CoinSymbol {
    pub const BTC: &'static str = "BTC";

    /// Trims and uppercases the raw ticker.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_btc(&self) -> bool {
        self.0 == Self::BTC
    }

    /// Currency the coin's series and prices are quoted in.
    ///
    /// BTC is quoted in dollars, every other coin in BTC.
    pub fn quote(&self) -> &'static str {
        if self.is_btc() { "USD" } else { Self::BTC }
    }
}

impl fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoinSymbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One hourly OHLCV bar as delivered by the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricePoint {
    /// Bar open time (unix seconds).
    pub time: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume_from: f64,
    pub volume_to: f64,
}

/// Decision-relevant reduction of a price series.
///
/// `current_volume` covers the most recent `period` bars, `average_volume`
/// the `ma_length` bars before them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub high: f64,
    pub low: f64,
    pub average_volume: f64,
    pub current_volume: f64,
    pub open: f64,
    pub close: f64,
}
