use std::collections::HashMap;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::MarketDataApi;
use super::types::{HistoryEnvelope, parse_btc_rates, price_tsyms, unit_prices};
use crate::errors::MarketError;
use crate::types::{CoinSymbol, PricePoint};

/// CryptoCompare `data` API client.
#[derive(Clone)]
pub struct CryptoCompareClient {
    http: ClientWithMiddleware,
    base_url: String,
    exchange: String,
}

impl CryptoCompareClient {
    pub fn new(
        http: ClientWithMiddleware,
        base_url: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            exchange: exchange.into(),
        }
    }

    pub fn history_url(&self, symbol: &CoinSymbol, limit: usize) -> Result<Url, MarketError> {
        Ok(Url::parse_with_params(
            &format!("{}/histohour", self.base_url),
            &[
                ("fsym", symbol.as_str()),
                ("tsym", symbol.quote()),
                ("limit", limit.to_string().as_str()),
                ("e", self.exchange.as_str()),
            ],
        )?)
    }

    pub fn price_url(&self, symbols: &[CoinSymbol]) -> Result<Url, MarketError> {
        Ok(Url::parse_with_params(
            &format!("{}/price", self.base_url),
            &[
                ("fsym", CoinSymbol::BTC),
                ("tsyms", price_tsyms(symbols).join(",").as_str()),
            ],
        )?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, MarketError> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl MarketDataApi for CryptoCompareClient {
    #[instrument(skip(self), fields(symbol = %symbol), level = "debug")]
    async fn history(
        &self,
        symbol: &CoinSymbol,
        limit: usize,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let envelope: HistoryEnvelope = self.get_json(self.history_url(symbol, limit)?).await?;
        let points = envelope.into_points(symbol)?;

        debug!(points = points.len(), "history fetched");
        Ok(points)
    }

    #[instrument(skip(self, symbols), fields(count = symbols.len()), level = "debug")]
    async fn current_prices(
        &self,
        symbols: &[CoinSymbol],
    ) -> Result<HashMap<CoinSymbol, f64>, MarketError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let body: serde_json::Value = self.get_json(self.price_url(symbols)?).await?;
        let rates = parse_btc_rates(body)?;

        debug!(rates = rates.len(), "spot prices fetched");
        Ok(unit_prices(symbols, &rates))
    }
}
