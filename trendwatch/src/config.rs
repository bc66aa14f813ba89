use std::str::FromStr;
use std::time::Duration;

use market::pulse::{ClassificationMode, SummaryWindow, TrendThresholds};

use crate::error::AppError;

pub const DEFAULT_CRYPTO_API_URL: &str = "https://min-api.cryptocompare.com/data";
pub const DEFAULT_COIN_LISTING_URL: &str = "https://coinmarketcap.com/";
pub const DEFAULT_SMS_API_URL: &str = "https://api.clockworksms.com/http/send.aspx";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    /// Non-durable; for dry runs only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}', expected 'sqlite' or 'memory'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: String,
}

#[derive(Clone, Debug)]
pub struct Endpoints {
    /// CryptoCompare `data` API base.
    pub crypto_api_url: String,

    /// Aggregate exchange passed as `e=`.
    pub exchange: String,

    /// Listing page scraped for the coin universe.
    pub coin_listing_url: String,

    pub sms_api_url: String,

    pub email_api_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DetectionConfig {
    pub window: SummaryWindow,
    pub thresholds: TrendThresholds,
    pub mode: ClassificationMode,

    /// Hourly bars requested per coin. Must cover `window.min_points()`.
    pub history_limit: usize,
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Recipients {
    pub sms_api_key: Option<String>,
    pub phones: Vec<String>,

    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub emails: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub endpoints: Endpoints,

    /// Fixed universe; replaces the listing scrape when set.
    pub coins: Option<Vec<String>>,

    pub detection: DetectionConfig,

    // =========================
    // Cooldown / reporting
    // =========================
    /// How long a notified coin is suppressed before its profit report.
    pub cooldown_ttl: Duration,

    /// Trailing window (hours) for the expiry high/low.
    pub report_window_hours: usize,

    /// Pause between consecutive upstream calls.
    ///
    /// Upstream bans clients that hammer it; every per-coin fetch and every
    /// expiry fetch is separated by this delay.
    pub request_delay: Duration,

    pub retry: RetryPolicy,
    pub recipients: Recipients,

    /// JSON log output (production).
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Sqlite,
                database_url: "sqlite://trendwatch.db?mode=rwc".to_string(),
            },
            endpoints: Endpoints {
                crypto_api_url: DEFAULT_CRYPTO_API_URL.to_string(),
                exchange: "CCCAGG".to_string(),
                coin_listing_url: DEFAULT_COIN_LISTING_URL.to_string(),
                sms_api_url: DEFAULT_SMS_API_URL.to_string(),
                email_api_url: None,
            },
            coins: None,
            detection: DetectionConfig {
                window: SummaryWindow::default(),
                thresholds: TrendThresholds::default(),
                mode: ClassificationMode::default(),
                history_limit: 80,
            },
            cooldown_ttl: Duration::from_secs(3 * 24 * 60 * 60),
            report_window_hours: 60,
            request_delay: Duration::from_secs(5),
            retry: RetryPolicy {
                timeout: Duration::from_secs(10),
                max_retries: 3,
            },
            recipients: Recipients::default(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let d = Self::default();

        let window = SummaryWindow {
            ma_length: env.parse("MA_LENGTH", d.detection.window.ma_length)?,
            period: env.parse("PERIOD", d.detection.window.period)?,
        };
        if window.ma_length == 0 || window.period == 0 {
            return Err(AppError::config("MA_LENGTH/PERIOD", "must be positive"));
        }

        let history_limit = env.parse("HISTORY_LIMIT", d.detection.history_limit)?;
        if history_limit < window.min_points() {
            return Err(AppError::config(
                "HISTORY_LIMIT",
                format!("must be at least {} for the summary window", window.min_points()),
            ));
        }

        let cfg = Self {
            store: StoreConfig {
                backend: env.parse("DEDUP_BACKEND", d.store.backend)?,
                database_url: env.string("DEDUP_DATABASE_URL", d.store.database_url),
            },
            endpoints: Endpoints {
                crypto_api_url: env.string("CRYPTO_API_URL", d.endpoints.crypto_api_url),
                exchange: env.string("CRYPTO_API_EXCHANGE", d.endpoints.exchange),
                coin_listing_url: env.string("COIN_LISTING_URL", d.endpoints.coin_listing_url),
                sms_api_url: env.string("SMS_API_URL", d.endpoints.sms_api_url),
                email_api_url: env.optional("EMAIL_API_URL"),
            },
            coins: env.optional("COINS").map(|v| split_csv(&v)),
            detection: DetectionConfig {
                window,
                thresholds: TrendThresholds {
                    volume: env.parse("VOLUME_THRESHOLD", d.detection.thresholds.volume)?,
                    price: env.parse("PRICE_THRESHOLD", d.detection.thresholds.price)?,
                },
                mode: env.parse("CLASSIFICATION_MODE", d.detection.mode)?,
                history_limit,
            },
            cooldown_ttl: Duration::from_secs(
                env.parse("COOLDOWN_TTL_SECS", d.cooldown_ttl.as_secs())?,
            ),
            report_window_hours: env.parse("REPORT_WINDOW_HOURS", d.report_window_hours)?,
            request_delay: Duration::from_millis(
                env.parse("REQUEST_DELAY_MS", d.request_delay.as_millis() as u64)?,
            ),
            retry: RetryPolicy {
                timeout: Duration::from_secs(
                    env.parse("HTTP_TIMEOUT_SECS", d.retry.timeout.as_secs())?,
                ),
                max_retries: env.parse("HTTP_MAX_RETRIES", d.retry.max_retries)?,
            },
            recipients: Recipients {
                sms_api_key: env.optional("SMS_API_KEY"),
                phones: env.optional("SMS_PHONES").map(|v| split_csv(&v)).unwrap_or_default(),
                email_api_key: env.optional("EMAIL_API_KEY"),
                email_from: env.optional("EMAIL_FROM"),
                emails: env.optional("EMAIL_TO").map(|v| split_csv(&v)).unwrap_or_default(),
            },
            json_logs: env.optional("APP_ENV").as_deref() == Some("production"),
        };

        if cfg.report_window_hours == 0 {
            return Err(AppError::config("REPORT_WINDOW_HOURS", "must be positive"));
        }

        Ok(cfg)
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Non-blank value for `key`.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: String) -> String {
        self.optional(key).unwrap_or(default)
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| AppError::config(key, format!("'{raw}': {e}"))),
            None => Ok(default),
        }
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = from_pairs(&[]).unwrap();

        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.detection.window, SummaryWindow { ma_length: 14, period: 4 });
        assert_eq!(cfg.detection.thresholds.volume, 3.0);
        assert_eq!(cfg.detection.thresholds.price, 1.1);
        assert_eq!(cfg.detection.mode, ClassificationMode::CloseOverOpen);
        assert_eq!(cfg.cooldown_ttl, Duration::from_secs(259_200));
        assert_eq!(cfg.request_delay, Duration::from_secs(5));
        assert_eq!(cfg.report_window_hours, 60);
        assert!(cfg.coins.is_none());
        assert!(!cfg.json_logs);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[
            ("PRICE_THRESHOLD", "1.15"),
            ("CLASSIFICATION_MODE", "high_low"),
            ("COOLDOWN_TTL_SECS", "86400"),
            ("DEDUP_BACKEND", "memory"),
            ("COINS", "eth, ada,,xrp"),
            ("SMS_PHONES", "15550001111,15550002222"),
            ("APP_ENV", "production"),
        ])
        .unwrap();

        assert_eq!(cfg.detection.thresholds.price, 1.15);
        assert_eq!(cfg.detection.mode, ClassificationMode::HighOverLow);
        assert_eq!(cfg.cooldown_ttl, Duration::from_secs(86_400));
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.coins, Some(vec!["eth".into(), "ada".into(), "xrp".into()]));
        assert_eq!(cfg.recipients.phones.len(), 2);
        assert!(cfg.json_logs);
    }

    #[test]
    fn bad_numbers_name_the_key() {
        let err = from_pairs(&[("VOLUME_THRESHOLD", "lots")]).unwrap_err();

        match err {
            AppError::Config { key, .. } => assert_eq!(key, "VOLUME_THRESHOLD"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn history_must_cover_summary_window() {
        let err = from_pairs(&[("HISTORY_LIMIT", "10")]).unwrap_err();

        assert!(err.to_string().contains("HISTORY_LIMIT"));
        assert!(from_pairs(&[("HISTORY_LIMIT", "19")]).is_ok());
    }

    #[test]
    fn zero_windows_are_rejected() {
        assert!(from_pairs(&[("PERIOD", "0")]).is_err());
    }
}
