use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{Notifier, NotifyError};

/// Sends every message on all channels.
///
/// Succeeds if at least one channel delivered.
pub struct FanoutNotifier {
    channels: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let mut delivered = 0usize;

        for ch in &self.channels {
            match ch.send(message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(channel = ch.name(), error = %e, "notification channel failed"),
            }
        }

        if delivered == 0 {
            return Err(NotifyError::AllChannelsFailed);
        }
        Ok(())
    }
}
