//! One pass over the coin universe.
//!
//! Data flow:
//! Universe → (skip deduped) → history → summarize → classify → spot prices
//! → notify → dedup record, then the expiry report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::logger::{TraceId, annotate_span, child_span, root_span};
use dedup::{DedupStore, StoreError};
use market::cryptocompare::MarketDataApi;
use market::format::format_unit_price;
use market::pulse::{SummaryWindow, TrendClassifier, TrendVerdict, summarize};
use market::universe::CoinUniverse;
use market::{CoinSymbol, MarketError};
use tracing::{Instrument, debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::notifier::Notifier;
use crate::reporter::{ExpiryOutcome, ExpiryReporter};

/// What one pass did.
#[derive(Debug, Default)]
pub struct PassSummary {
    /// Coins fetched and classified.
    pub evaluated: usize,
    /// Coins skipped because they are in cooldown.
    pub deduped: usize,
    /// Coins whose fetch or summary failed.
    pub failed: usize,
    pub trending: Vec<CoinSymbol>,
    /// Trending coins written to the dedup store.
    pub recorded: Vec<CoinSymbol>,
    pub notified: bool,
    pub expiry: ExpiryOutcome,
}

pub struct Orchestrator {
    universe: Arc<dyn CoinUniverse>,
    market: Arc<dyn MarketDataApi>,
    store: Arc<dyn DedupStore>,
    notifier: Arc<dyn Notifier>,
    reporter: ExpiryReporter,

    classifier: TrendClassifier,
    window: SummaryWindow,
    history_limit: usize,
    cooldown_ttl: Duration,
    request_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        cfg: &AppConfig,
        universe: Arc<dyn CoinUniverse>,
        market: Arc<dyn MarketDataApi>,
        store: Arc<dyn DedupStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let reporter = ExpiryReporter::new(
            Arc::clone(&market),
            Arc::clone(&store),
            Arc::clone(&notifier),
            cfg.report_window_hours,
            cfg.request_delay,
        );

        Self {
            universe,
            market,
            store,
            notifier,
            reporter,
            classifier: TrendClassifier::new(cfg.detection.thresholds, cfg.detection.mode),
            window: cfg.detection.window,
            history_limit: cfg.detection.history_limit,
            cooldown_ttl: cfg.cooldown_ttl,
            request_delay: cfg.request_delay,
        }
    }

    /// Runs the trend scan and then the expiry report.
    ///
    /// Per-coin failures are logged and skipped. A store failure aborts the
    /// whole pass, expiry report included.
    pub async fn run_pass(&self, now_ms: u64) -> Result<PassSummary, AppError> {
        let trace_id = TraceId::new();
        let span = root_span("pass", &trace_id);

        async move {
            info!(now_ms, "pass started");

            let mut summary = match self.universe.fetch().await {
                Ok(coins) => self.scan(&coins, now_ms).await?,
                Err(e) => {
                    warn!(error = %e, "coin universe unavailable; skipping trend scan");
                    PassSummary::default()
                }
            };

            let upstream_called = summary.evaluated + summary.failed > 0;
            summary.expiry = self.reporter.run(now_ms, upstream_called).await?;

            info!(
                evaluated = summary.evaluated,
                deduped = summary.deduped,
                failed = summary.failed,
                trending = summary.trending.len(),
                expired = summary.expiry.lines.len(),
                "pass complete"
            );
            Ok::<_, AppError>(summary)
        }
        .instrument(span)
        .await
    }

    async fn scan(&self, coins: &[CoinSymbol], now_ms: u64) -> Result<PassSummary, StoreError> {
        let mut summary = PassSummary::default();
        let mut fetched = false;

        for symbol in coins {
            if self.store.exists(symbol).await? {
                debug!(symbol = %symbol, "in cooldown; skipping");
                summary.deduped += 1;
                continue;
            }

            if fetched {
                tokio::time::sleep(self.request_delay).await;
            }
            fetched = true;

            let span = child_span("evaluate");
            let verdict = async {
                annotate_span(symbol.as_str());
                self.evaluate(symbol).await
            }
            .instrument(span)
            .await;

            match verdict {
                Ok(v) => {
                    summary.evaluated += 1;
                    if v.trending {
                        info!(
                            symbol = %symbol,
                            price_ratio = v.price_ratio,
                            volume_ratio = v.volume_ratio,
                            "coin is trending"
                        );
                        summary.trending.push(symbol.clone());
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        symbol = %symbol,
                        error = %e,
                        transient = e.is_transient(),
                        data_shape = e.is_data_shape(),
                        "skipping coin"
                    );
                }
            }
        }

        if !summary.trending.is_empty() {
            let (recorded, notified) = self.notify_trending(&summary.trending, now_ms).await?;
            summary.recorded = recorded;
            summary.notified = notified;
        }

        Ok(summary)
    }

    async fn evaluate(&self, symbol: &CoinSymbol) -> Result<TrendVerdict, MarketError> {
        let points = self.market.history(symbol, self.history_limit).await?;
        let series = summarize(&points, self.window)?;
        Ok(self.classifier.evaluate(symbol, &series))
    }

    /// Notifies the trending batch and records it in the dedup store.
    ///
    /// Without spot prices nothing is sent or recorded; the coins are simply
    /// re-evaluated next pass.
    async fn notify_trending(
        &self,
        trending: &[CoinSymbol],
        now_ms: u64,
    ) -> Result<(Vec<CoinSymbol>, bool), StoreError> {
        // A trending batch always follows at least one history fetch.
        tokio::time::sleep(self.request_delay).await;

        let prices = match self.market.current_prices(trending).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, count = trending.len(), "spot prices unavailable; not notifying");
                return Ok((Vec::new(), false));
            }
        };

        let mut records = HashMap::with_capacity(trending.len());
        for symbol in trending {
            let price = prices.get(symbol).copied().unwrap_or_else(|| {
                warn!(symbol = %symbol, "no spot price; recording 0");
                0.0
            });
            records.insert(symbol.clone(), price);
        }

        let message = format_trending_message(trending, &records);
        let notified = match self.notifier.send(&message).await {
            Ok(()) => {
                info!(count = trending.len(), "trending notification sent");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to deliver trending notification");
                false
            }
        };

        self.store
            .record_batch(&records, self.cooldown_ttl, now_ms)
            .await?;

        Ok((trending.to_vec(), notified))
    }
}

/// `"LINK 4521sat, BTC $64124 trending"`; coins without a price are listed bare.
pub fn format_trending_message(coins: &[CoinSymbol], prices: &HashMap<CoinSymbol, f64>) -> String {
    let parts: Vec<String> = coins
        .iter()
        .map(|c| match prices.get(c) {
            Some(&p) if p > 0.0 => format!("{c} {}", format_unit_price(c, p)),
            _ => c.to_string(),
        })
        .collect();
    format!("{} trending", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trending_message_lists_prices() {
        let coins = vec![CoinSymbol::new("LINK"), CoinSymbol::new("BTC"), CoinSymbol::new("NEW")];
        let prices = HashMap::from([
            (CoinSymbol::new("LINK"), 0.000_045_21),
            (CoinSymbol::new("BTC"), 64_123.6),
            (CoinSymbol::new("NEW"), 0.0),
        ]);

        assert_eq!(
            format_trending_message(&coins, &prices),
            "LINK 4521sat, BTC $64124, NEW trending"
        );
    }
}
