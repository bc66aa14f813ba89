use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::MarketError;
use crate::types::{CoinSymbol, PricePoint};

pub const SUCCESS: &str = "Success";

/// `histohour` response body.
///
/// `Data` is only an array on success; error bodies carry an object or
/// nothing, so it is kept raw until the status is checked.
#[derive(Debug, Deserialize)]
pub struct HistoryEnvelope {
    #[serde(rename = "Response", default)]
    pub response: String,

    #[serde(rename = "Message", default)]
    pub message: String,

    #[serde(rename = "Data", default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RawBar {
    pub time: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volumefrom: f64,
    pub volumeto: f64,
}

impl From<RawBar> for PricePoint {
    fn from(b: RawBar) -> Self {
        PricePoint {
            time: b.time,
            open: b.open,
            close: b.close,
            high: b.high,
            low: b.low,
            volume_from: b.volumefrom,
            volume_to: b.volumeto,
        }
    }
}

impl HistoryEnvelope {
    pub fn into_points(self, symbol: &CoinSymbol) -> Result<Vec<PricePoint>, MarketError> {
        if self.response != SUCCESS {
            return Err(MarketError::Api {
                symbol: symbol.to_string(),
                message: if self.message.is_empty() {
                    self.response
                } else {
                    self.message
                },
            });
        }

        let bars: Vec<RawBar> = serde_json::from_value(self.data)?;
        if bars.is_empty() {
            return Err(MarketError::EmptyPayload {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars.into_iter().map(PricePoint::from).collect())
    }
}

/// Quote currencies to request from `price?fsym=BTC` for `symbols`.
pub fn price_tsyms(symbols: &[CoinSymbol]) -> Vec<&str> {
    let mut tsyms = Vec::with_capacity(symbols.len());
    for s in symbols {
        let t = if s.is_btc() { "USD" } else { s.as_str() };
        if !tsyms.contains(&t) {
            tsyms.push(t);
        }
    }
    tsyms
}

/// Parses a `price?fsym=BTC` body into BTC→symbol rates.
pub fn parse_btc_rates(body: serde_json::Value) -> Result<HashMap<String, f64>, MarketError> {
    let serde_json::Value::Object(map) = body else {
        return Err(MarketError::Malformed("price response is not an object".into()));
    };

    if let Some(status) = map.get("Response").and_then(|v| v.as_str()) {
        if status != SUCCESS {
            let message = map
                .get("Message")
                .and_then(|v| v.as_str())
                .unwrap_or(status)
                .to_string();
            return Err(MarketError::Api {
                symbol: "BTC".into(),
                message,
            });
        }
    }

    Ok(map
        .into_iter()
        .filter_map(|(k, v)| v.as_f64().map(|rate| (k, rate)))
        .collect())
}

/// Turns BTC→symbol rates into unit prices in each symbol's quote.
///
/// For altcoins the rate is inverted (BTC per coin); a zero rate maps to 0.
/// BTC itself takes its dollar rate.
pub fn unit_prices(symbols: &[CoinSymbol], rates: &HashMap<String, f64>) -> HashMap<CoinSymbol, f64> {
    let mut out = HashMap::with_capacity(symbols.len());
    for s in symbols {
        let price = if s.is_btc() {
            rates.get("USD").copied()
        } else {
            rates
                .get(s.as_str())
                .map(|&r| if r > 0.0 { 1.0 / r } else { 0.0 })
        };
        if let Some(p) = price {
            out.insert(s.clone(), p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eth() -> CoinSymbol {
        CoinSymbol::new("ETH")
    }

    #[test]
    fn success_envelope_yields_points() {
        let env: HistoryEnvelope = serde_json::from_value(json!({
            "Response": "Success",
            "Data": [
                {"time": 1, "open": 1.0, "close": 2.0, "high": 3.0, "low": 0.5, "volumefrom": 7.0, "volumeto": 8.0},
                {"time": 2, "open": 2.0, "close": 2.5, "high": 2.6, "low": 1.9, "volumefrom": 1.0, "volumeto": 2.0}
            ]
        }))
        .unwrap();

        let points = env.into_points(&eth()).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].volume_to, 8.0);
        assert_eq!(points[1].time, 2);
    }

    #[test]
    fn error_envelope_is_an_api_error() {
        let env: HistoryEnvelope = serde_json::from_value(json!({
            "Response": "Error",
            "Message": "There is no data for the symbol XYZ",
            "Data": {}
        }))
        .unwrap();

        match env.into_points(&CoinSymbol::new("XYZ")) {
            Err(MarketError::Api { symbol, message }) => {
                assert_eq!(symbol, "XYZ");
                assert!(message.contains("no data"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_data_is_reported() {
        let env: HistoryEnvelope =
            serde_json::from_value(json!({"Response": "Success", "Data": []})).unwrap();

        assert!(matches!(
            env.into_points(&eth()),
            Err(MarketError::EmptyPayload { .. })
        ));
    }

    #[test]
    fn btc_is_requested_as_usd() {
        let symbols = vec![CoinSymbol::new("BTC"), eth(), CoinSymbol::new("ADA")];

        assert_eq!(price_tsyms(&symbols), vec!["USD", "ETH", "ADA"]);
    }

    #[test]
    fn rates_are_inverted_into_unit_prices() {
        let rates = parse_btc_rates(json!({"ETH": 20.0, "USD": 60000.0, "DOGE": 0.0})).unwrap();
        let symbols = vec![eth(), CoinSymbol::new("BTC"), CoinSymbol::new("DOGE"), CoinSymbol::new("NOPE")];

        let prices = unit_prices(&symbols, &rates);

        assert_eq!(prices[&eth()], 0.05);
        assert_eq!(prices[&CoinSymbol::new("BTC")], 60000.0);
        assert_eq!(prices[&CoinSymbol::new("DOGE")], 0.0);
        assert!(!prices.contains_key(&CoinSymbol::new("NOPE")));
    }

    #[test]
    fn price_error_body_is_rejected() {
        let err = parse_btc_rates(json!({"Response": "Error", "Message": "rate limit"})).unwrap_err();

        assert!(err.is_transient());
    }
}
