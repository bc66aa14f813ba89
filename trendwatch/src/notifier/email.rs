use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument};

use super::{Notifier, NotifyError};

/// Mailgun-style HTTP mail API: form POST with basic auth (`api`, key).
pub struct EmailNotifier {
    http: Client,
    url: String,
    api_key: String,
    from: String,
    to: Vec<String>,
    subject: String,
}

impl EmailNotifier {
    pub fn new(http: Client, url: String, api_key: String, from: String, to: Vec<String>) -> Self {
        Self {
            http,
            url,
            api_key,
            from,
            to,
            subject: "Trending coins".to_string(),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(skip_all, level = "debug")]
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let to = self.to.join(",");

        self.http
            .post(&self.url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from.as_str()),
                ("to", to.as_str()),
                ("subject", self.subject.as_str()),
                ("text", message),
            ])
            .send()
            .await?
            .error_for_status()?;

        info!(to = %to, "email sent");
        Ok(())
    }
}
