pub mod cryptocompare;
pub mod errors;
pub mod format;
pub mod http;
pub mod pulse;
pub mod types;
pub mod universe;

pub use errors::MarketError;
pub use types::{CoinSymbol, PricePoint, SeriesSummary};
