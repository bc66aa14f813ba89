pub mod email;
pub mod fanout;
pub mod sms;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use email::EmailNotifier;
pub use fanout::FanoutNotifier;
pub use sms::SmsNotifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected message: {0}")]
    Rejected(String),

    #[error("no channel delivered the message")]
    AllChannelsFailed,
}

/// A delivery channel for short text alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log only. Used when no channel is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        info!(message, "notification (log only)");
        Ok(())
    }
}
