use std::str::FromStr;

use tracing::{error, warn};

use crate::types::{CoinSymbol, SeriesSummary};

/// Which price ratio gates the trend decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassificationMode {
    /// `close / open` over the current window.
    #[default]
    CloseOverOpen,
    /// `high / low` over the current window.
    HighOverLow,
}

impl FromStr for ClassificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close_open" | "close/open" => Ok(Self::CloseOverOpen),
            "high_low" | "high/low" => Ok(Self::HighOverLow),
            other => Err(format!(
                "unknown classification mode '{other}', expected 'close_open' or 'high_low'"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendThresholds {
    /// Minimum `current_volume / average_volume`.
    pub volume: f64,
    /// Minimum price ratio.
    pub price: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            volume: super::DEFAULT_VOLUME_THRESHOLD,
            price: super::DEFAULT_PRICE_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendVerdict {
    pub price_ratio: f64,
    pub volume_ratio: f64,
    pub trending: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TrendClassifier {
    thresholds: TrendThresholds,
    mode: ClassificationMode,
}

impl TrendClassifier {
    pub fn new(thresholds: TrendThresholds, mode: ClassificationMode) -> Self {
        Self { thresholds, mode }
    }

    pub fn is_trending(&self, symbol: &CoinSymbol, summary: &SeriesSummary) -> bool {
        self.evaluate(symbol, summary).trending
    }

    /// Applies both gates to `summary`.
    ///
    /// Zero average volume neutralizes the volume gate (ratio pinned at the
    /// threshold). A zero price denominator is never trending.
    pub fn evaluate(&self, symbol: &CoinSymbol, summary: &SeriesSummary) -> TrendVerdict {
        let (mut volume, mut average) = (summary.current_volume, summary.average_volume);
        if average == 0.0 {
            warn!(symbol = %symbol, "average volume is 0; ignoring volume gate");
            volume = self.thresholds.volume;
            average = 1.0;
        }
        let volume_ratio = volume / average;

        let (numerator, denominator) = match self.mode {
            ClassificationMode::CloseOverOpen => (summary.close, summary.open),
            ClassificationMode::HighOverLow => (summary.high, summary.low),
        };

        if denominator == 0.0 {
            error!(symbol = %symbol, mode = ?self.mode, "price is 0; cannot compute price ratio");
            return TrendVerdict {
                price_ratio: 0.0,
                volume_ratio,
                trending: false,
            };
        }

        let price_ratio = numerator / denominator;

        TrendVerdict {
            price_ratio,
            volume_ratio,
            trending: price_ratio >= self.thresholds.price && volume_ratio >= self.thresholds.volume,
        }
    }
}
