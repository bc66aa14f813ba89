//! Wires configuration into concrete collaborators.

use std::sync::Arc;

use dedup::{DedupStore, InMemoryDedupStore, SqliteDedupStore};
use market::cryptocompare::{CryptoCompareClient, MarketDataApi};
use market::http::build_http_client;
use market::universe::{CoinMarketCapScraper, CoinUniverse, StaticUniverse};
use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};
use crate::error::AppError;
use crate::notifier::{EmailNotifier, FanoutNotifier, LogNotifier, Notifier, SmsNotifier};
use crate::orchestrator::Orchestrator;

/// Opens the dedup store. Failure here is a store outage.
pub async fn init_store(cfg: &AppConfig) -> Result<Arc<dyn DedupStore>, AppError> {
    match cfg.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteDedupStore::connect(&cfg.store.database_url).await?;
            info!(url = %cfg.store.database_url, "sqlite dedup store ready");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("using in-memory dedup store; cooldowns will not survive restart");
            Ok(Arc::new(InMemoryDedupStore::new()))
        }
    }
}

/// Builds the enabled notification channels.
///
/// A channel is enabled when its key and at least one recipient are set.
/// With none enabled, messages only go to the log.
pub fn init_notifier(cfg: &AppConfig) -> Result<Arc<dyn Notifier>, AppError> {
    let http = reqwest::Client::builder()
        .timeout(cfg.retry.timeout)
        .build()
        .map_err(|e| AppError::config("HTTP_TIMEOUT_SECS", e.to_string()))?;

    let r = &cfg.recipients;
    let mut channels: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(key) = r.sms_api_key.as_ref().filter(|_| !r.phones.is_empty()) {
        channels.push(Arc::new(SmsNotifier::new(
            http.clone(),
            cfg.endpoints.sms_api_url.clone(),
            key.clone(),
            r.phones.clone(),
        )));
    }

    if let (Some(url), Some(key), Some(from)) = (
        cfg.endpoints.email_api_url.as_ref(),
        r.email_api_key.as_ref(),
        r.email_from.as_ref(),
    ) {
        if !r.emails.is_empty() {
            channels.push(Arc::new(EmailNotifier::new(
                http.clone(),
                url.clone(),
                key.clone(),
                from.clone(),
                r.emails.clone(),
            )));
        }
    }

    if channels.is_empty() {
        warn!("no notification channel configured; messages will only be logged");
        return Ok(Arc::new(LogNotifier));
    }

    info!(
        channels = ?channels.iter().map(|c| c.name()).collect::<Vec<_>>(),
        "notification channels ready"
    );
    Ok(Arc::new(FanoutNotifier::new(channels)))
}

pub async fn build_orchestrator(cfg: &AppConfig) -> Result<Orchestrator, AppError> {
    let http = build_http_client(cfg.retry.timeout, cfg.retry.max_retries)?;

    let market: Arc<dyn MarketDataApi> = Arc::new(CryptoCompareClient::new(
        http.clone(),
        cfg.endpoints.crypto_api_url.clone(),
        cfg.endpoints.exchange.clone(),
    ));

    let universe: Arc<dyn CoinUniverse> = match &cfg.coins {
        Some(coins) => Arc::new(StaticUniverse::new(coins.iter().cloned())),
        None => Arc::new(CoinMarketCapScraper::new(
            http,
            cfg.endpoints.coin_listing_url.clone(),
        )?),
    };

    let store = init_store(cfg).await?;
    let notifier = init_notifier(cfg)?;

    Ok(Orchestrator::new(cfg, universe, market, store, notifier))
}
