use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::errors::MarketError;

/// Shared HTTP client for upstream market calls.
///
/// Transient failures (connect errors, 5xx, 429) are retried with exponential
/// backoff up to `max_retries` times.
pub fn build_http_client(
    timeout: Duration,
    max_retries: u32,
) -> Result<ClientWithMiddleware, MarketError> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(30))
        .build()?;

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
