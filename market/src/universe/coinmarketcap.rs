use async_trait::async_trait;
use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, instrument};

use super::CoinUniverse;
use crate::errors::MarketError;

/// Classic listing markup.
const SYMBOL_SPAN: &str = r#"<span class="currency-symbol"><a href="/currencies/.*?/">(.*?)<"#;

/// Embedded listing JSON used by newer page builds.
const SYMBOL_JSON: &str = r#""symbol":"([A-Za-z0-9]{1,12})""#;

/// Scrapes ticker symbols off the CoinMarketCap front page.
#[derive(Clone)]
pub struct CoinMarketCapScraper {
    http: ClientWithMiddleware,
    url: String,
    patterns: [Regex; 2],
}

impl CoinMarketCapScraper {
    pub fn new(http: ClientWithMiddleware, url: impl Into<String>) -> Result<Self, MarketError> {
        let compile = |p: &str| Regex::new(p).map_err(|e| MarketError::Scrape(e.to_string()));

        Ok(Self {
            http,
            url: url.into(),
            patterns: [compile(SYMBOL_SPAN)?, compile(SYMBOL_JSON)?],
        })
    }

    /// Symbols in page order, taken from the first pattern that matches.
    pub fn extract_symbols(&self, html: &str) -> Vec<String> {
        for re in &self.patterns {
            let found: Vec<String> = re
                .captures_iter(html)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl CoinUniverse for CoinMarketCapScraper {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_raw(&self) -> Result<Vec<String>, MarketError> {
        let html = self
            .http
            .get(self.url.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let symbols = self.extract_symbols(&html);
        if symbols.is_empty() {
            return Err(MarketError::Scrape("no symbols found on listing page".into()));
        }

        debug!(url = %self.url, count = symbols.len(), "listing scraped");
        Ok(symbols)
    }
}
