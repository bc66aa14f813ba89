//! Trend detection over hourly series.
//!
//! A series is first reduced to a [`SeriesSummary`](crate::types::SeriesSummary)
//! by [`summary::summarize`], then gated by [`trend::TrendClassifier`].

pub mod summary;
pub mod trend;

pub use summary::{SummaryWindow, summarize};
pub use trend::{ClassificationMode, TrendClassifier, TrendThresholds, TrendVerdict};

/// Moving-average window length (bars).
pub const DEFAULT_MA_LENGTH: usize = 14;

/// Recent-activity window length (bars).
pub const DEFAULT_PERIOD: usize = 4;

pub const DEFAULT_VOLUME_THRESHOLD: f64 = 3.0;
pub const DEFAULT_PRICE_THRESHOLD: f64 = 1.1;
