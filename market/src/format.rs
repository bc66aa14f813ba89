//! Human-readable price rendering for notifications.

use crate::types::CoinSymbol;

pub const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

/// Converts a BTC-denominated unit price to whole satoshis.
pub fn to_satoshis(btc: f64) -> u64 {
    // `as` saturates: negatives and NaN land on 0.
    (btc * SATOSHIS_PER_BTC).round() as u64
}

/// Renders a unit price in the coin's quote currency.
pub fn format_unit_price(symbol: &CoinSymbol, unit_price: f64) -> String {
    if symbol.is_btc() {
        format!("${unit_price:.0}")
    } else {
        format!("{}sat", to_satoshis(unit_price))
    }
}
