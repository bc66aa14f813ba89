use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("api rejected request for {symbol}: {message}")]
    Api { symbol: String, message: String },

    #[error("no data returned for {symbol}")]
    EmptyPayload { symbol: String },

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("insufficient history: need {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid summary parameters: {0}")]
    InvalidParameters(String),

    #[error("coin listing scrape failed: {0}")]
    Scrape(String),
}

impl MarketError {
    /// Network / upstream failures that a later pass may not hit.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http(_) | Self::Api { .. } | Self::EmptyPayload { .. }
        )
    }

    /// The payload arrived but cannot be summarized.
    pub fn is_data_shape(&self) -> bool {
        matches!(
            self,
            Self::Json(_)
                | Self::Malformed(_)
                | Self::InsufficientData { .. }
                | Self::InvalidParameters(_)
        )
    }
}
