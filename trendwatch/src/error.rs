use dedup::StoreError;
use market::MarketError;
use thiserror::Error;

use crate::notifier::NotifyError;

/// Process exit status for an unanticipated fault (error or panic).
pub const EXIT_FAULT: u8 = 2;

/// Process exit status when the dedup store is unreachable.
pub const EXIT_STORE_UNAVAILABLE: u8 = 3;

/// Process exit status for an invalid configuration.
pub const EXIT_CONFIG: u8 = 4;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("pass aborted: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("invalid configuration {key}: {reason}")]
    Config { key: String, reason: String },

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl AppError {
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StoreUnavailable(_) => EXIT_STORE_UNAVAILABLE,
            Self::Config { .. } => EXIT_CONFIG,
            Self::Market(_) | Self::Notify(_) => EXIT_FAULT,
        }
    }
}
