//! Expiry pass: once a coin's cooldown ends, report how its price moved
//! since the notification and clear its record.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dedup::{DedupStore, StoreError};
use market::cryptocompare::MarketDataApi;
use market::{CoinSymbol, PricePoint};
use tracing::{debug, info, warn};

use crate::notifier::Notifier;

/// Signed percent change from `buy` to `current`, rounded to a whole percent.
///
/// `None` when `buy` is zero (or not finite) and no change can be computed.
pub fn pct_change(buy: f64, current: f64) -> Option<String> {
    if buy == 0.0 || !buy.is_finite() || !current.is_finite() {
        return None;
    }

    let pct = ((buy - current).abs() / buy.abs() * 100.0).round() as u64;
    let sign = if current > buy { '+' } else { '-' };
    Some(format!("{sign}{pct}%"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Change {
        symbol: CoinSymbol,
        high: String,
        low: String,
    },
    /// No usable notification price was recorded.
    Unreportable { symbol: CoinSymbol },
    /// The trailing window could not be fetched.
    NoData { symbol: CoinSymbol },
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change { symbol, high, low } => write!(f, "{symbol} hi {high} lo {low}"),
            Self::Unreportable { symbol } => write!(f, "{symbol} unreportable"),
            Self::NoData { symbol } => write!(f, "{symbol} no data"),
        }
    }
}

pub fn format_expiry_message(lines: &[ReportLine]) -> String {
    let body: Vec<String> = lines.iter().map(ToString::to_string).collect();
    format!("Expired: {}", body.join(", "))
}

#[derive(Debug, Default)]
pub struct ExpiryOutcome {
    pub lines: Vec<ReportLine>,
    pub delivered: bool,
}

pub struct ExpiryReporter {
    market: Arc<dyn MarketDataApi>,
    store: Arc<dyn DedupStore>,
    notifier: Arc<dyn Notifier>,
    window_hours: usize,
    request_delay: Duration,
}

impl ExpiryReporter {
    pub fn new(
        market: Arc<dyn MarketDataApi>,
        store: Arc<dyn DedupStore>,
        notifier: Arc<dyn Notifier>,
        window_hours: usize,
        request_delay: Duration,
    ) -> Self {
        Self {
            market,
            store,
            notifier,
            window_hours,
            request_delay,
        }
    }

    /// Reports every record expired at `now_ms`, then removes them all.
    ///
    /// Nothing is sent when nothing has expired. Only store failures are
    /// returned; fetch and delivery failures are logged per symbol.
    /// `after_upstream_call` spaces the first fetch from the caller's last one.
    pub async fn run(
        &self,
        now_ms: u64,
        after_upstream_call: bool,
    ) -> Result<ExpiryOutcome, StoreError> {
        let expired = self.store.list_expired(now_ms).await?;
        if expired.is_empty() {
            debug!("no expired dedup records");
            return Ok(ExpiryOutcome::default());
        }

        info!(count = expired.len(), "reporting expired coins");

        let mut lines = Vec::with_capacity(expired.len());
        let mut fetched = after_upstream_call;

        for symbol in &expired {
            let buy = self.store.notified_price(symbol).await?;
            let Some(buy) = buy.filter(|p| *p != 0.0 && p.is_finite()) else {
                warn!(symbol = %symbol, price = ?buy, "no usable notification price; unreportable");
                lines.push(ReportLine::Unreportable {
                    symbol: symbol.clone(),
                });
                continue;
            };

            if fetched {
                tokio::time::sleep(self.request_delay).await;
            }
            fetched = true;

            lines.push(self.report_symbol(symbol, buy).await);
        }

        let delivered = match self.notifier.send(&format_expiry_message(&lines)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to deliver expiry report");
                false
            }
        };

        self.purge(&expired).await?;

        Ok(ExpiryOutcome { lines, delivered })
    }

    async fn report_symbol(&self, symbol: &CoinSymbol, buy: f64) -> ReportLine {
        let points = match self.market.history(symbol, self.window_hours).await {
            Ok(p) => p,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "failed to fetch expiry window");
                return ReportLine::NoData {
                    symbol: symbol.clone(),
                };
            }
        };

        let Some((high, low)) = high_low(&points) else {
            return ReportLine::NoData {
                symbol: symbol.clone(),
            };
        };

        // buy is non-zero here
        match (pct_change(buy, high), pct_change(buy, low)) {
            (Some(high), Some(low)) => ReportLine::Change {
                symbol: symbol.clone(),
                high,
                low,
            },
            _ => ReportLine::Unreportable {
                symbol: symbol.clone(),
            },
        }
    }

    async fn purge(&self, symbols: &BTreeSet<CoinSymbol>) -> Result<(), StoreError> {
        self.store.remove(symbols).await?;
        info!(count = symbols.len(), "expired dedup records removed");
        Ok(())
    }
}

fn high_low(points: &[PricePoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let high = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
    let low = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
    Some((high, low))
}
