use market::CoinSymbol;

/// A coin that was notified and is in cooldown until `expires_at_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupRecord {
    pub symbol: CoinSymbol,

    /// Unit price (in the coin's quote currency) at notification time.
    pub notified_price: f64,

    pub expires_at_ms: u64,
}

impl DedupRecord {
    pub fn new(symbol: CoinSymbol, notified_price: f64, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            symbol,
            notified_price,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms <= now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive() {
        let r = DedupRecord::new(CoinSymbol::new("ETH"), 0.05, 1_000, 500);

        assert_eq!(r.expires_at_ms, 1_500);
        assert!(!r.is_expired(1_499));
        assert!(r.is_expired(1_500));
    }

    #[test]
    fn ttl_saturates() {
        let r = DedupRecord::new(CoinSymbol::new("ETH"), 1.0, u64::MAX - 1, 10);

        assert_eq!(r.expires_at_ms, u64::MAX);
    }
}
