use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument};

use super::{Notifier, NotifyError};

/// Clockwork-style HTTP SMS gateway.
///
/// The gateway answers 200 even on failure; an `Error` in the body marks a
/// rejected message.
pub struct SmsNotifier {
    http: Client,
    url: String,
    api_key: String,
    phones: Vec<String>,
}

impl SmsNotifier {
    pub fn new(http: Client, url: String, api_key: String, phones: Vec<String>) -> Self {
        Self {
            http,
            url,
            api_key,
            phones,
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    fn name(&self) -> &'static str {
        "sms"
    }

    #[instrument(skip_all, level = "debug")]
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let to = self.phones.join(",");

        let body = self
            .http
            .get(&self.url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("to", to.as_str()),
                ("content", message),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if body.contains("Error") {
            return Err(NotifyError::Rejected(body));
        }

        info!(to = %to, "sms sent");
        Ok(())
    }
}
